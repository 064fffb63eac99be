/// A single parsed `station;value` line. Borrows the station name from the chunk
/// it was parsed out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub station: &'a str,
    pub value: f32,
}

impl<'a> Record<'a> {
    pub fn new(station: &'a str, value: f32) -> Self {
        Self { station, value }
    }
}

use std::collections::hash_map::{self, HashMap};

/// Station name -> every value observed for it. Collections only grow while
/// ingesting; the order of values within a station is not meaningful.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationValues {
    stations: HashMap<String, Vec<f32>>,
}

impl StationValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, creating the station's collection on first sight
    pub fn push(&mut self, station: &str, value: f32) {
        // Look up by &str first so known stations don't allocate a key
        if let Some(values) = self.stations.get_mut(station) {
            values.push(value);
        } else {
            self.stations.insert(station.to_string(), vec![value]);
        }
    }

    /// Append a whole collection for one station. Existing values are kept and the
    /// new ones concatenated after them.
    pub fn extend_station(&mut self, station: String, values: Vec<f32>) {
        match self.stations.entry(station) {
            hash_map::Entry::Occupied(mut entry) => entry.get_mut().extend(values),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(values);
            }
        }
    }

    /// Fold another map into this one, concatenating collections for shared keys
    pub fn absorb(&mut self, other: StationValues) {
        for (station, values) in other {
            self.extend_station(station, values);
        }
    }

    pub fn get(&self, station: &str) -> Option<&[f32]> {
        self.stations.get(station).map(Vec::as_slice)
    }

    /// Number of distinct stations
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Total number of values across all stations
    pub fn value_count(&self) -> usize {
        self.stations.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Vec<f32>> {
        self.stations.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<f32>> {
        self.stations
    }
}

impl From<HashMap<String, Vec<f32>>> for StationValues {
    fn from(stations: HashMap<String, Vec<f32>>) -> Self {
        Self { stations }
    }
}

impl IntoIterator for StationValues {
    type Item = (String, Vec<f32>);
    type IntoIter = hash_map::IntoIter<String, Vec<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.into_iter()
    }
}

impl<'a> IntoIterator for &'a StationValues {
    type Item = (&'a String, &'a Vec<f32>);
    type IntoIter = hash_map::Iter<'a, String, Vec<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

use crate::utils::constants::{FIELD_DELIMITER, OUTPUT_DECIMALS};
use std::fmt;

/// Final per-station statistics. `avg` is already rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub station: String,
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

impl Outcome {
    pub fn new(station: String, min: f32, max: f32, avg: f32) -> Self {
        Self {
            station,
            min,
            max,
            avg,
        }
    }
}

/// Renders the output line layout `station;min;max;avg` without the newline
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = FIELD_DELIMITER as char;
        write!(
            f,
            "{}{sep}{:.prec$}{sep}{:.prec$}{sep}{:.prec$}",
            self.station,
            self.min,
            self.max,
            self.avg,
            prec = OUTPUT_DECIMALS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_layout() {
        let outcome = Outcome::new("Huesca".to_string(), 10.0, 20.0, 15.0);
        assert_eq!(outcome.to_string(), "Huesca;10.00;20.00;15.00");

        let outcome = Outcome::new("Teruel".to_string(), -3.25, 0.5, -1.38);
        assert_eq!(outcome.to_string(), "Teruel;-3.25;0.50;-1.38");
    }
}

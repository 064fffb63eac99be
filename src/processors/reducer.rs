use crate::error::{ProcessingError, Result};
use crate::models::{Outcome, StationValues};
use rayon::prelude::*;

/// Round to two decimals, halves away from zero.
///
/// Operates on the binary value of `value * 100`, so a decimal literal that is
/// not exactly representable rounds according to its nearest `f64`.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean by a single iterative pass. Stack use does not depend on the
/// number of values.
pub fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(0.0_f64, |acc, &v| acc + f64::from(v));
    Some(sum / values.len() as f64)
}

/// Min, max and rounded mean for one station
pub fn compute_outcome(station: String, values: &[f32]) -> Result<Outcome> {
    let (first, rest) = match values.split_first() {
        Some(split) => split,
        None => return Err(ProcessingError::EmptyStation { station }),
    };

    let (min, max) = rest
        .iter()
        .fold((*first, *first), |(min, max), &v| (min.min(v), max.max(v)));

    let avg = match mean(values) {
        Some(avg) => round_to_hundredths(avg) as f32,
        None => return Err(ProcessingError::EmptyStation { station }),
    };

    Ok(Outcome::new(station, min, max, avg))
}

/// Turns the merged station map into per-station outcomes.
pub struct StatisticsReducer {
    max_workers: usize,
}

impl StatisticsReducer {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Compute every station's outcome in parallel. The result is sorted by station
    /// name so repeated runs write identical output.
    pub fn reduce(&self, merged: StationValues) -> Result<Vec<Outcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let mut outcomes: Vec<Outcome> = pool.install(|| {
            merged
                .into_inner()
                .into_par_iter()
                .map(|(station, values)| compute_outcome(station, &values))
                .collect::<Result<Vec<_>>>()
        })?;

        outcomes.sort_by(|a, b| a.station.cmp(&b.station));
        Ok(outcomes)
    }
}

impl Default for StatisticsReducer {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_compute_outcome() {
        let outcome = compute_outcome("Huesca".to_string(), &[10.0, 20.0]).unwrap();
        assert_eq!(outcome, Outcome::new("Huesca".to_string(), 10.0, 20.0, 15.0));

        let outcome = compute_outcome("Zaragoza".to_string(), &[5.5]).unwrap();
        assert_eq!(outcome.min, 5.5);
        assert_eq!(outcome.max, 5.5);
        assert_eq!(outcome.avg, 5.5);
    }

    #[test]
    fn test_avg_is_rounded_to_two_decimals() {
        // mean = 1.3333...
        let outcome = compute_outcome("Teruel".to_string(), &[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(outcome.avg, 1.33);

        // mean = -0.125, exactly representable, rounds away from zero
        let outcome = compute_outcome("Teruel".to_string(), &[-0.25, 0.0]).unwrap();
        assert_eq!(outcome.avg, -0.13);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to_hundredths(0.125), 0.13);
        assert_eq!(round_to_hundredths(-0.125), -0.13);
        assert_eq!(round_to_hundredths(2.0), 2.0);
    }

    #[test]
    fn test_empty_station_is_an_error() {
        let err = compute_outcome("Ghost".to_string(), &[]).unwrap_err();
        assert!(matches!(err, ProcessingError::EmptyStation { ref station } if station == "Ghost"));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_large_station_does_not_overflow() {
        let values: Vec<f32> = (0..1_000_000).map(|i| (i % 100) as f32).collect();

        let outcome = compute_outcome("Huesca".to_string(), &values).unwrap();
        assert_eq!(outcome.min, 0.0);
        assert_eq!(outcome.max, 99.0);
        assert_eq!(outcome.avg, 49.5);
    }

    #[test]
    fn test_reduce_sorts_by_station() -> Result<()> {
        let mut stations = HashMap::new();
        stations.insert("Zaragoza".to_string(), vec![5.5]);
        stations.insert("Huesca".to_string(), vec![10.0, 20.0]);
        stations.insert("Teruel".to_string(), vec![-1.0, 1.0]);

        let outcomes = StatisticsReducer::new(2).reduce(StationValues::from(stations))?;

        let names: Vec<&str> = outcomes.iter().map(|o| o.station.as_str()).collect();
        assert_eq!(names, vec!["Huesca", "Teruel", "Zaragoza"]);
        assert_eq!(outcomes[1].avg, 0.0);
        Ok(())
    }

    #[test]
    fn test_reduce_propagates_empty_station() {
        let mut stations = HashMap::new();
        stations.insert("Huesca".to_string(), vec![1.0]);
        stations.insert("Ghost".to_string(), Vec::new());

        let result = StatisticsReducer::new(2).reduce(StationValues::from(stations));
        assert!(matches!(result, Err(ProcessingError::EmptyStation { .. })));
    }
}

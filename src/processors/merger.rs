use crate::error::{ProcessingError, Result};
use crate::models::StationValues;
use crate::utils::constants::MERGE_SHARDS;
use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Mutex, MutexGuard};

type Shard = HashMap<String, Vec<f32>>;

/// Shared station map that many workers fold their local results into.
///
/// Keys are spread over independently locked shards by hash. A merge buckets its
/// entries per shard and takes each touched shard's lock once. Collections for a
/// key that is already present are appended to, never replaced.
pub struct StationMerger {
    shards: Vec<Mutex<Shard>>,
    hasher: RandomState,
}

impl StationMerger {
    pub fn new() -> Self {
        Self::with_shards(MERGE_SHARDS)
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, station: &str) -> usize {
        (self.hasher.hash_one(station) % self.shards.len() as u64) as usize
    }

    fn lock(&self, index: usize) -> Result<MutexGuard<'_, Shard>> {
        self.shards[index]
            .lock()
            .map_err(|_| ProcessingError::DataMerge(format!("merge shard {} is poisoned", index)))
    }

    /// Fold one worker's local map into the shared map
    pub fn merge(&self, local: StationValues) -> Result<()> {
        if local.is_empty() {
            return Ok(());
        }

        let mut buckets: Vec<Vec<(String, Vec<f32>)>> = vec![Vec::new(); self.shards.len()];
        for (station, values) in local {
            let index = self.shard_index(&station);
            buckets[index].push((station, values));
        }

        for (index, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            let mut shard = self.lock(index)?;
            for (station, values) in bucket {
                match shard.entry(station) {
                    Entry::Occupied(mut entry) => entry.get_mut().extend(values),
                    Entry::Vacant(entry) => {
                        entry.insert(values);
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of distinct stations merged so far
    pub fn station_count(&self) -> Result<usize> {
        let mut total = 0;
        for index in 0..self.shards.len() {
            total += self.lock(index)?.len();
        }
        Ok(total)
    }

    /// Consume the merger once every worker has finished
    pub fn into_station_values(self) -> Result<StationValues> {
        let mut merged = HashMap::new();

        for (index, shard) in self.shards.into_iter().enumerate() {
            let shard = shard.into_inner().map_err(|_| {
                ProcessingError::DataMerge(format!("merge shard {} is poisoned", index))
            })?;
            // Shards hold disjoint key sets
            merged.extend(shard);
        }

        Ok(StationValues::from(merged))
    }
}

impl Default for StationMerger {
    fn default() -> Self {
        Self::new()
    }
}

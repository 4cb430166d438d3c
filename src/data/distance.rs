//! Lane → distance lookup.
//!
//! Built once per run from the distance table and then only read. Every
//! distance lookup in expansion and projection goes through this index,
//! so those cross-products stay O(origins × destinations) instead of
//! rescanning the table per lane.

use std::collections::{HashMap, HashSet};

use crate::types::{LaneKey, LaneRecord};

/// Distance per lane, plus the distinct origins of the source table.
#[derive(Debug, Clone, Default)]
pub struct DistanceIndex {
    distances: HashMap<LaneKey, f64>,
    /// Distinct origins in order of first appearance.
    origins: Vec<i64>,
}

impl DistanceIndex {
    /// Build the index from a distance table.
    ///
    /// Duplicate lanes resolve to their last occurrence. Rows without a
    /// distance still contribute their origin but no lane entry.
    pub fn build(table: &[LaneRecord]) -> Self {
        let mut distances = HashMap::with_capacity(table.len());
        let mut origins = Vec::new();
        let mut seen = HashSet::new();

        for record in table {
            if seen.insert(record.origin_id) {
                origins.push(record.origin_id);
            }
            if let Some(distance) = record.distance {
                distances.insert(record.key(), distance);
            }
        }

        Self { distances, origins }
    }

    pub fn get(&self, origin_id: i64, destination_id: i64) -> Option<f64> {
        self.lookup(&LaneKey::new(origin_id, destination_id))
    }

    pub fn lookup(&self, key: &LaneKey) -> Option<f64> {
        self.distances.get(key).copied()
    }

    pub fn contains(&self, key: &LaneKey) -> bool {
        self.distances.contains_key(key)
    }

    /// Distinct origins of the source table, first-appearance order.
    pub fn origins(&self) -> &[i64] {
        &self.origins
    }

    /// Number of distinct lanes with a known distance.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

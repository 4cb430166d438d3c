//! Join freight records against the distance index.

use crate::error::Stage;
use crate::types::LaneRecord;

use super::distance::DistanceIndex;

/// Attach a distance to every freight record.
///
/// Output is 1:1 with the input, order preserved. Lanes absent from the
/// index get `distance = None`; whatever distance the freight row carried
/// before is replaced, so the index stays the single source of truth.
pub fn merge(freight: &[LaneRecord], index: &DistanceIndex) -> Vec<LaneRecord> {
    let merged: Vec<LaneRecord> = freight
        .iter()
        .map(|record| LaneRecord {
            distance: index.lookup(&record.key()),
            ..record.clone()
        })
        .collect();

    let unresolved = merged.iter().filter(|r| r.distance.is_none()).count();
    if unresolved > 0 {
        tracing::warn!(
            stage = Stage::Merge.as_str(),
            rows = merged.len(),
            unresolved,
            "freight records without a known distance"
        );
    } else {
        tracing::debug!(stage = Stage::Merge.as_str(), rows = merged.len(), "all lanes resolved");
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> DistanceIndex {
        DistanceIndex::build(&[
            LaneRecord::distance(1, 2, 10.0),
            LaneRecord::distance(1, 3, 20.0),
        ])
    }

    #[test]
    fn test_merge_resolves_known_lanes() {
        let freight = vec![
            LaneRecord::freight(1, 3, 400.0),
            LaneRecord::freight(1, 2, 210.0),
        ];
        let merged = merge(&freight, &index());

        assert_eq!(merged[0].distance, Some(20.0));
        assert_eq!(merged[1].distance, Some(10.0));
        assert_eq!(merged[0].freight_cost, Some(400.0));
    }

    #[test]
    fn test_merge_marks_missing_not_zero() {
        let freight = vec![
            LaneRecord::freight(1, 2, 210.0),
            LaneRecord::freight(5, 6, 999.0),
            LaneRecord::freight(1, 2, 220.0),
        ];
        let merged = merge(&freight, &index());

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].distance, None);
        assert_eq!(merged[1].key(), freight[1].key());
        // Duplicates are kept and resolved independently
        assert_eq!(merged[2].distance, Some(10.0));
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(&[], &index()).is_empty());
    }
}

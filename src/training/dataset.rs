//! Dense training matrix plus the partitioning helpers used by the
//! trainer: seeded train/test split and contiguous K-fold.

use rand::prelude::*;

use crate::types::{LaneRecord, Row};

/// Feature rows and their targets, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub targets: Vec<f64>,
}

/// Outcome of turning a modeling table into a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub dataset: Dataset,
    /// Rows dropped for a missing distance.
    pub missing_distance: usize,
    /// Rows dropped for a missing freight cost.
    pub missing_cost: usize,
}

impl Extraction {
    pub fn excluded(&self) -> usize {
        self.missing_distance + self.missing_cost
    }
}

impl Dataset {
    /// Build from a merged modeling table.
    ///
    /// Rows without a distance or without a freight cost are excluded:
    /// they would otherwise enter the fit as garbage features or targets.
    pub fn from_records(records: &[LaneRecord]) -> Extraction {
        let mut extraction = Extraction::default();

        for record in records {
            let Some(features) = record.features() else {
                extraction.missing_distance += 1;
                continue;
            };
            let Some(cost) = record.freight_cost else {
                extraction.missing_cost += 1;
                continue;
            };
            extraction.dataset.rows.push(features.to_row());
            extraction.dataset.targets.push(cost);
        }

        extraction
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Rows at the given positions, in that order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Seeded shuffle split. The test side gets `ceil(test_ratio * n)` rows.
    pub fn train_test_split(&self, test_ratio: f64, seed: u64) -> (Dataset, Dataset) {
        let n = self.len();
        let n_test = test_size(n, test_ratio);

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let (test, train) = order.split_at(n_test);
        (self.subset(train), self.subset(test))
    }
}

pub fn test_size(n: usize, test_ratio: f64) -> usize {
    ((n as f64 * test_ratio).ceil() as usize).min(n)
}

/// One cross-validation fold as (fit indices, validation indices).
pub type Fold = (Vec<usize>, Vec<usize>);

/// Contiguous, unshuffled K-fold over `n` rows.
///
/// The first `n % k` folds get one extra validation row.
pub fn kfold(n: usize, k: usize) -> Vec<Fold> {
    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;

    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        let validation: Vec<usize> = (start..end).collect();
        let fit: Vec<usize> = (0..start).chain(end..n).collect();
        folds.push((fit, validation));
        start = end;
    }

    folds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        Dataset {
            rows: (0..n).map(|i| [i as f64, 0.0, 10.0 * i as f64]).collect(),
            targets: (0..n).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn test_from_records_excludes_missing() {
        let mut with_distance = LaneRecord::freight(1, 2, 100.0);
        with_distance.distance = Some(10.0);
        let no_distance = LaneRecord::freight(1, 3, 200.0);
        let no_cost = LaneRecord::distance(1, 2, 10.0);

        let extraction = Dataset::from_records(&[with_distance, no_distance, no_cost]);
        assert_eq!(extraction.dataset.len(), 1);
        assert_eq!(extraction.dataset.rows[0], [1.0, 2.0, 10.0]);
        assert_eq!(extraction.missing_distance, 1);
        assert_eq!(extraction.missing_cost, 1);
        assert_eq!(extraction.excluded(), 2);
    }

    #[test]
    fn test_split_sizes() {
        let data = dataset(11);
        let (train, test) = data.train_test_split(0.2, 42);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_seeded() {
        let data = dataset(50);
        let a = data.train_test_split(0.2, 42);
        let b = data.train_test_split(0.2, 42);
        let c = data.train_test_split(0.2, 7);
        assert_eq!(a, b);
        assert_ne!(a.1, c.1);
    }

    #[test]
    fn test_split_is_partition() {
        let data = dataset(20);
        let (train, test) = data.train_test_split(0.2, 1);
        let mut all: Vec<f64> = train.targets.iter().chain(&test.targets).copied().collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(all, data.targets);
    }

    #[test]
    fn test_kfold_covers_every_row_once() {
        let folds = kfold(8, 3);
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].1, vec![0, 1, 2]);
        assert_eq!(folds[1].1, vec![3, 4, 5]);
        assert_eq!(folds[2].1, vec![6, 7]);

        for (fit, validation) in &folds {
            assert_eq!(fit.len() + validation.len(), 8);
            assert!(validation.iter().all(|v| !fit.contains(v)));
        }
    }
}

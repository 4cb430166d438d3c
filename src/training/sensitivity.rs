//! Permutation feature importance.
//!
//! ## Method
//!
//! Measure how much each input feature matters to a fitted model by:
//! 1. Scoring the model on held-out rows (R², the baseline)
//! 2. Shuffling one feature column, breaking its link to the target
//! 3. Re-scoring; importance = baseline - shuffled score
//! 4. Repeating `n_repeats` times and averaging
//!
//! Features whose shuffling barely moves the score are not load-bearing:
//! the model gets its signal elsewhere. Negative means are possible (the
//! shuffled column scored better by chance) and are reported as-is.

use owo_colors::OwoColorize;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{Feature, Row};

use super::dataset::Dataset;
use super::metrics::{mean, r2_score, std_dev};

/// Importance of one feature over all repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    pub importance_mean: f64,
    pub importance_std: f64,
    /// Score drop per repeat
    pub importances: Vec<f64>,
}

/// Permutation importance of every feature, ranked descending by mean.
///
/// A single RNG seeded from `seed` drives all shuffles, features in
/// [`Feature::ALL`] order, so the result is reproducible.
pub fn permutation_importance<F>(
    data: &Dataset,
    n_repeats: usize,
    seed: u64,
    predict: F,
) -> Vec<FeatureImportance>
where
    F: Fn(&Row) -> f64,
{
    let score = |rows: &[Row]| {
        let predictions: Vec<f64> = rows.iter().map(&predict).collect();
        r2_score(&data.targets, &predictions)
    };

    let baseline = score(&data.rows);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut permuted = data.rows.clone();

    let mut ranked: Vec<FeatureImportance> = Feature::ALL
        .iter()
        .map(|&feature| {
            let column = feature.index();
            let mut values: Vec<f64> = data.rows.iter().map(|r| r[column]).collect();

            let importances: Vec<f64> = (0..n_repeats)
                .map(|_| {
                    values.shuffle(&mut rng);
                    for (row, &value) in permuted.iter_mut().zip(&values) {
                        row[column] = value;
                    }
                    baseline - score(&permuted)
                })
                .collect();

            // Restore the column before moving to the next feature
            for (row, original) in permuted.iter_mut().zip(&data.rows) {
                row[column] = original[column];
            }

            FeatureImportance {
                feature,
                importance_mean: mean(&importances),
                importance_std: std_dev(&importances),
                importances,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.importance_mean.total_cmp(&a.importance_mean));
    ranked
}

/// Print a ranked importance table.
pub fn print_importance(importance: &[FeatureImportance]) {
    println!("\n{}\n", "=== Feature Importance (Permutation) ===".bold());

    let max = importance
        .iter()
        .map(|f| f.importance_mean)
        .fold(0.0f64, f64::max);

    for (rank, entry) in importance.iter().enumerate() {
        let bar_len = if max > 0.0 {
            ((entry.importance_mean.max(0.0) / max) * 40.0).round() as usize
        } else {
            0
        };
        let bar = "█".repeat(bar_len.min(40));
        println!(
            "{:>22}: {:>8.4} ± {:<7.4} [{}] {}",
            entry.feature.column(),
            entry.importance_mean,
            entry.importance_std,
            rank + 1,
            bar.cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        Dataset {
            rows: (0..30)
                .map(|i| [(i % 5) as f64, (i % 7) as f64, i as f64 * 3.0])
                .collect(),
            targets: (0..30).map(|i| i as f64 * 6.0).collect(),
        }
    }

    #[test]
    fn test_only_used_feature_matters() {
        let ranked = permutation_importance(&data(), 10, 42, |row: &Row| row[2] * 2.0);

        assert_eq!(ranked[0].feature, Feature::Distance);
        assert!(ranked[0].importance_mean > 0.5);
        for other in &ranked[1..] {
            assert_eq!(other.importance_mean, 0.0);
            assert_eq!(other.importances.len(), 10);
        }
    }

    #[test]
    fn test_sorted_descending() {
        let ranked =
            permutation_importance(&data(), 5, 42, |row: &Row| row[2] * 2.0 + row[0] * 0.5);
        for pair in ranked.windows(2) {
            assert!(pair[0].importance_mean >= pair[1].importance_mean);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let predict = |row: &Row| row[0] + row[1] + row[2];
        let a = permutation_importance(&data(), 10, 42, predict);
        let b = permutation_importance(&data(), 10, 42, predict);
        assert_eq!(a, b);
    }
}

//! Model training: split, search, refit, evaluate, explain.
//!
//! ```text
//! modeling table ─→ Dataset ─→ 80/20 split ─┬─ train ─→ random search (K-fold R²)
//!                    (drop rows              │             ↓
//!                     missing distance       │          refit best
//!                     or cost)               │             ↓
//!                                            └─ test ──→ RMSE/MAPE + permutation importance
//! ```
//!
//! Every stochastic step (split, candidate draw, subsampling, shuffles) is
//! seeded from [`TrainerConfig::seed`]; two runs over the same table yield
//! the same model and the same report.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Stage};
use crate::types::{LaneRecord, Regressor};

use super::boosting::GradientBoostedTrees;
use super::dataset::{Dataset, test_size};
use super::gridsearch::{
    SearchSpace, SearchStrategy, best_candidate, cross_validate, sample_candidates,
};
use super::metrics::{EvalMetrics, RegressionMetrics};
use super::report::TrainingReport;
use super::sensitivity::permutation_importance;

/// Trainer settings. Defaults: 10 random candidates, 3 folds, seed 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrainerConfig {
    /// Seed for split, search, boosting and importance shuffles
    pub seed: u64,
    /// Share of rows held out for testing
    pub test_ratio: f64,
    pub strategy: SearchStrategy,
    /// Candidates drawn by random search
    pub n_iter: usize,
    pub cv_folds: usize,
    /// Shuffles per feature for permutation importance
    pub n_repeats: usize,
    /// Floor on usable rows; raised further if the split or folds need it
    pub min_rows: usize,
    pub search: SearchSpace,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_ratio: 0.2,
            strategy: SearchStrategy::Random,
            n_iter: 10,
            cv_folds: 3,
            n_repeats: 10,
            min_rows: 10,
            search: SearchSpace::default(),
        }
    }
}

/// Accepted `test-ratio` values, inclusive.
pub const TEST_RATIO_RANGE: (f64, f64) = (0.01, 0.9);

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        let (low, high) = TEST_RATIO_RANGE;
        if !(self.test_ratio >= low && self.test_ratio <= high) {
            return Err(Error::InvalidConfig(format!(
                "test-ratio must be in [{}, {}], got {}",
                low, high, self.test_ratio
            )));
        }
        if self.cv_folds < 2 {
            return Err(Error::InvalidConfig(format!(
                "cv-folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.n_iter == 0 {
            return Err(Error::InvalidConfig("n-iter must be at least 1".into()));
        }
        if self.n_repeats == 0 {
            return Err(Error::InvalidConfig("n-repeats must be at least 1".into()));
        }
        self.search.validate()
    }

    /// Fewest usable rows accepted by [`train`].
    ///
    /// At least `min_rows`, and enough that the test partition has two
    /// rows and every CV validation fold has two rows.
    pub fn required_rows(&self) -> usize {
        let ratio = self.test_ratio;
        let min_train = 2 * self.cv_folds;

        // ceil(n·r) >= 2 needs n > 1/r; n - ceil(n·r) >= 2k needs n >= 2k/(1-r)
        let bound = (1.0 / ratio)
            .floor()
            .max(min_train as f64 / (1.0 - ratio) - 1.0)
            .max(0.0) as usize;

        let mut n = self.min_rows.max(2).max(bound);
        loop {
            let test = test_size(n, self.test_ratio);
            let train = n - test;
            if test >= 2 && train >= min_train {
                return n;
            }
            n += 1;
        }
    }
}

/// Fit a freight-cost model on a merged modeling table.
///
/// Rows with a missing distance or cost are excluded first. Fails with
/// [`Error::InsufficientData`] before any fit if too few rows remain.
pub fn train(
    records: &[LaneRecord],
    config: &TrainerConfig,
) -> Result<(GradientBoostedTrees, TrainingReport)> {
    config.validate()?;

    let extraction = Dataset::from_records(records);
    if extraction.excluded() > 0 {
        tracing::warn!(
            stage = Stage::Training.as_str(),
            missing_distance = extraction.missing_distance,
            missing_cost = extraction.missing_cost,
            "excluding rows that cannot be used for fitting"
        );
    }

    let data = &extraction.dataset;
    let required = config.required_rows();
    if data.len() < required {
        return Err(Error::InsufficientData {
            stage: Stage::Training,
            rows: data.len(),
            required,
        });
    }

    let (train_set, test_set) = data.train_test_split(config.test_ratio, config.seed);
    tracing::info!(
        stage = Stage::Training.as_str(),
        rows = data.len(),
        train = train_set.len(),
        test = test_set.len(),
        "split modeling table"
    );

    let candidates =
        sample_candidates(&config.search, config.strategy, config.n_iter, config.seed)?;
    tracing::info!(
        stage = Stage::Training.as_str(),
        candidates = candidates.len(),
        folds = config.cv_folds,
        strategy = ?config.strategy,
        "starting hyperparameter search"
    );

    let search = cross_validate(&train_set, &candidates, config.cv_folds, config.seed);
    let best = best_candidate(&search)
        .ok_or_else(|| Error::InvalidConfig("hyperparameter search produced no candidates".into()))?
        .clone();
    tracing::info!(
        stage = Stage::Training.as_str(),
        n_estimators = best.params.n_estimators,
        max_depth = best.params.max_depth,
        learning_rate = best.params.learning_rate,
        subsample = best.params.subsample,
        colsample_bytree = best.params.colsample_bytree,
        cv_r2 = best.mean_score,
        "selected hyperparameters"
    );

    let model = GradientBoostedTrees::fit(&train_set, &best.params, config.seed);

    let metrics = EvalMetrics {
        train: RegressionMetrics::compute(&train_set.targets, &model.predict_all(&train_set.rows)),
        test: RegressionMetrics::compute(&test_set.targets, &model.predict_all(&test_set.rows)),
    };
    tracing::info!(
        stage = Stage::Training.as_str(),
        rmse_train = metrics.train.rmse,
        rmse_test = metrics.test.rmse,
        mape_train = metrics.train.mape,
        mape_test = metrics.test.mape,
        "evaluated model"
    );

    let importance =
        permutation_importance(&test_set, config.n_repeats, config.seed, |row| model.predict_row(row));
    for entry in &importance {
        tracing::debug!(
            stage = Stage::Training.as_str(),
            feature = entry.feature.column(),
            importance = entry.importance_mean,
            std = entry.importance_std,
            "permutation importance"
        );
    }

    let report = TrainingReport {
        best_params: best.params,
        best_cv_score: best.mean_score,
        search,
        rows_used: data.len(),
        rows_excluded: extraction.excluded(),
        train_rows: train_set.len(),
        test_rows: test_set.len(),
        metrics,
        importance,
    };

    Ok((model, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::gridsearch::HyperParams;

    fn quick_config() -> TrainerConfig {
        TrainerConfig {
            n_iter: 4,
            search: SearchSpace {
                n_estimators: vec![20, 40],
                max_depth: vec![2, 3],
                learning_rate: vec![0.1, 0.3],
                subsample: vec![0.8, 1.0],
                colsample_bytree: vec![0.6, 1.0],
            },
            ..TrainerConfig::default()
        }
    }

    fn modeling_table(n: usize) -> Vec<LaneRecord> {
        (0..n)
            .map(|i| {
                let origin = (i % 4) as i64 + 1;
                let destination = (i % 5) as i64 + 10;
                let distance = 50.0 + 13.0 * i as f64;
                LaneRecord {
                    origin_id: origin,
                    destination_id: destination,
                    distance: Some(distance),
                    freight_cost: Some(2.5 * distance + 40.0),
                }
            })
            .collect()
    }

    #[test]
    fn test_required_rows_defaults() {
        assert_eq!(TrainerConfig::default().required_rows(), 10);

        let tiny = TrainerConfig {
            min_rows: 0,
            ..TrainerConfig::default()
        };
        // test = ceil(0.2n) >= 2 and train >= 6
        assert_eq!(tiny.required_rows(), 8);
    }

    #[test]
    fn test_required_rows_small_test_ratio() {
        let config = TrainerConfig {
            test_ratio: 0.01,
            ..TrainerConfig::default()
        };
        assert!(config.validate().is_ok());
        // ceil(101 · 0.01) = 2 is the first two-row test partition
        assert_eq!(config.required_rows(), 101);
    }

    #[test]
    fn test_test_ratio_out_of_range_rejected() {
        for test_ratio in [0.0, 1e-9, 0.95, 1.0, f64::NAN] {
            let config = TrainerConfig {
                test_ratio,
                ..TrainerConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "test_ratio {} accepted",
                test_ratio
            );
        }
    }

    #[test]
    fn test_insufficient_data_before_fit() {
        let result = train(&modeling_table(5), &quick_config());
        match result {
            Err(Error::InsufficientData { rows, required, stage }) => {
                assert_eq!(rows, 5);
                assert_eq!(required, 10);
                assert_eq!(stage, Stage::Training);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|(_, r)| r)),
        }
    }

    #[test]
    fn test_missing_rows_count_against_minimum() {
        let mut table = modeling_table(12);
        for record in table.iter_mut().take(4) {
            record.distance = None;
        }
        assert!(matches!(
            train(&table, &quick_config()),
            Err(Error::InsufficientData { rows: 8, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainerConfig {
            cv_folds: 1,
            ..quick_config()
        };
        assert!(matches!(
            train(&modeling_table(30), &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_train_reports_metrics_and_importance() {
        let mut table = modeling_table(40);
        table.push(LaneRecord::freight(1, 10, 999.0));

        let (model, report) = train(&table, &quick_config()).unwrap();

        assert_eq!(report.rows_used, 40);
        assert_eq!(report.rows_excluded, 1);
        assert_eq!(report.test_rows, 8);
        assert_eq!(report.train_rows, 32);
        assert_eq!(report.search.len(), 4);
        assert_eq!(report.importance.len(), 3);
        assert_eq!(model.params(), &report.best_params);
        assert!(report.metrics.train.rmse.is_finite());
        assert!(report.metrics.test.mape.is_finite());

        for pair in report.importance.windows(2) {
            assert!(pair[0].importance_mean >= pair[1].importance_mean);
        }
    }

    #[test]
    fn test_train_is_deterministic() {
        let table = modeling_table(30);
        let (model_a, report_a) = train(&table, &quick_config()).unwrap();
        let (model_b, report_b) = train(&table, &quick_config()).unwrap();

        assert_eq!(report_a.best_params, report_b.best_params);
        assert_eq!(report_a.metrics, report_b.metrics);
        assert_eq!(report_a.search, report_b.search);
        assert_eq!(model_a, model_b);
    }

    #[test]
    fn test_best_params_come_from_search() {
        let (_, report) = train(&modeling_table(30), &quick_config()).unwrap();
        let searched: Vec<HyperParams> = report.search.iter().map(|s| s.params).collect();
        assert!(searched.contains(&report.best_params));
        assert!(report
            .search
            .iter()
            .all(|s| s.mean_score <= report.best_cv_score));
    }
}

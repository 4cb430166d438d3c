//! Freight-cost model training.
//!
//! This module turns a merged modeling table into a fitted regressor:
//! 1. Build a dense dataset, excluding rows without distance or cost
//! 2. Seeded 80/20 train/test split
//! 3. Random search over a discrete boosted-tree space (K-fold R²)
//! 4. Refit the best candidate on the full training partition
//! 5. Report RMSE/MAPE on train and test
//! 6. Rank features by permutation importance on the test partition
//!
//! ## Features
//!
//! The feature set is fixed: `id_city_origin`, `id_city_destination`,
//! `distance`. Ids enter the model as plain numbers, as in the stock
//! model; trees can still carve out individual cities through splits.
//!
//! ## Usage
//!
//! ```no_run
//! use freightq::training::{TrainerConfig, train};
//! # fn demo(modeling: &[freightq::LaneRecord]) -> freightq::Result<()> {
//! let (model, report) = train(modeling, &TrainerConfig::default())?;
//! println!("test RMSE {:.2}", report.metrics.test.rmse);
//! # Ok(())
//! # }
//! ```

pub mod boosting;
pub mod dataset;
pub mod gridsearch;
pub mod metrics;
pub mod report;
pub mod sensitivity;
pub mod trainer;

pub use boosting::{GradientBoostedTrees, RegressionTree};
pub use dataset::{Dataset, Extraction, kfold};
pub use gridsearch::{
    CandidateScore, HyperParams, SearchSpace, SearchStrategy, best_candidate, cross_validate,
    sample_candidates,
};
pub use metrics::{
    EvalMetrics, RegressionMetrics, mean_absolute_percentage_error, r2_score, rmse,
};
pub use report::{TrainingReport, print_summary};
pub use sensitivity::{FeatureImportance, permutation_importance};
pub use trainer::{TrainerConfig, train};

//! Training report: what was searched, what was picked, how well it fits.

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use super::gridsearch::{CandidateScore, HyperParams};
use super::metrics::EvalMetrics;
use super::sensitivity::{FeatureImportance, print_importance};

/// Everything an operator needs to judge a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub best_params: HyperParams,
    /// Mean cross-validated R² of the selected candidate
    pub best_cv_score: f64,
    /// Every candidate in sample order
    pub search: Vec<CandidateScore>,
    pub rows_used: usize,
    pub rows_excluded: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: EvalMetrics,
    /// Ranked, most important first
    pub importance: Vec<FeatureImportance>,
}

impl TrainingReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Print the report to the terminal.
pub fn print_summary(report: &TrainingReport) {
    println!();
    println!("{}", " TRAINING COMPLETE ".bold().on_green());
    println!();

    let p = &report.best_params;
    println!("  {}", "Best parameters".bold());
    println!(
        "    n_estimators={} max_depth={} learning_rate={} subsample={} colsample_bytree={}",
        p.n_estimators, p.max_depth, p.learning_rate, p.subsample, p.colsample_bytree
    );
    println!(
        "    cv R² {:.4} over {} candidates",
        report.best_cv_score,
        report.search.len()
    );

    println!();
    println!(
        "  {} {} used, {} excluded ({} train / {} test)",
        "Rows".bold(),
        report.rows_used,
        report.rows_excluded,
        report.train_rows,
        report.test_rows
    );

    let m = &report.metrics;
    println!();
    println!("  {:<6} {:>14} {:>10}", "", "RMSE", "MAPE");
    println!("  {:<6} {:>14.4} {:>10.4}", "train", m.train.rmse, m.train.mape);
    println!(
        "  {:<6} {:>14.4} {:>10.4}",
        "test".bold(),
        m.test.rmse,
        m.test.mape
    );

    print_importance(&report.importance);
}

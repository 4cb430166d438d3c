//! Regression evaluation metrics.
//!
//! ## Metrics Overview
//!
//! | Metric | What it measures                               | Range    | Better |
//! |--------|------------------------------------------------|----------|--------|
//! | RMSE   | Typical error magnitude, in cost units         | 0.0-∞    | lower  |
//! | MAPE   | Mean relative error (0.12 = 12%)               | 0.0-∞    | lower  |
//! | R²     | Share of target variance explained             | -∞-1.0   | higher |
//!
//! R² is the selection score for cross-validation and the baseline for
//! permutation importance. RMSE and MAPE are reported for the train and
//! test partitions; the test figures are the ones that reveal over- or
//! under-fitting.

use serde::{Deserialize, Serialize};

/// RMSE and MAPE for one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mape: f64,
    pub n_rows: usize,
}

impl RegressionMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            rmse: rmse(actual, predicted),
            mape: mean_absolute_percentage_error(actual, predicted),
            n_rows: actual.len(),
        }
    }
}

/// Train and test metrics of the selected model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

/// Root mean squared error. 0.0 on empty input.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    (sum_sq / actual.len() as f64).sqrt()
}

/// Mean absolute percentage error, as a fraction.
///
/// ```text
/// MAPE = mean(|y - ŷ| / max(|y|, ε))
/// ```
///
/// ε keeps zero-cost rows finite (they produce a huge but finite term).
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).abs() / y.abs().max(f64::EPSILON))
        .sum();
    total / actual.len() as f64
}

/// Coefficient of determination.
///
/// ```text
/// R² = 1 - SS_res / SS_tot
/// ```
///
/// With a constant target (SS_tot = 0) the score is 1.0 for a perfect fit
/// and 0.0 otherwise, so folds of identical costs never yield NaN.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let m = mean(actual);
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|y| (y - m).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

// === Utility functions ===

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

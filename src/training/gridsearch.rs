//! Hyperparameter space exploration for the boosted-tree regressor.
//!
//! ## Search Strategies
//!
//! | Strategy | When to use                                             |
//! |----------|---------------------------------------------------------|
//! | Random   | Default. `n_iter` distinct combinations, sampled once   |
//! | Grid     | Exhaustive; every combination of the space is evaluated |
//!
//! ## Default Space
//!
//! | Parameter          | Values              |
//! |--------------------|---------------------|
//! | n_estimators       | 500, 1000, 1500     |
//! | max_depth          | 5, 7, 9             |
//! | learning_rate      | 0.01, 0.1, 0.3      |
//! | subsample          | 0.6, 0.8, 1.0       |
//! | colsample_bytree   | 0.6, 0.8, 1.0       |
//!
//! 243 combinations. Random search draws without replacement, so the
//! candidates are distinct.
//!
//! ## Scoring
//!
//! Each candidate is scored by mean R² over contiguous K-fold splits of the
//! training partition. Candidates are independent, so they are evaluated
//! on the rayon pool; results come back in sample order and the earliest
//! best score wins, which keeps selection deterministic for a given seed.

use rand::prelude::*;
use rand::seq::index;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Stage};

use super::boosting::GradientBoostedTrees;
use super::dataset::{Dataset, kfold};
use super::metrics::{mean, r2_score};

/// One boosted-tree configuration.
///
/// Construct through [`HyperParams::new`] so out-of-range values are
/// rejected before any fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Boosting rounds
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Shrinkage applied to every leaf (0, 1]
    pub learning_rate: f64,
    /// Fraction of rows drawn per round (0, 1]
    pub subsample: f64,
    /// Fraction of features drawn per tree (0, 1]
    pub colsample_bytree: f64,
}

impl HyperParams {
    pub fn new(
        n_estimators: usize,
        max_depth: usize,
        learning_rate: f64,
        subsample: f64,
        colsample_bytree: f64,
    ) -> Result<Self> {
        let params = Self {
            n_estimators,
            max_depth,
            learning_rate,
            subsample,
            colsample_bytree,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(Error::InvalidHyperParams(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )))
            }
        };

        if self.n_estimators == 0 {
            return Err(Error::InvalidHyperParams("n_estimators must be > 0".into()));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidHyperParams("max_depth must be > 0".into()));
        }
        unit("learning_rate", self.learning_rate)?;
        unit("subsample", self.subsample)?;
        unit("colsample_bytree", self.colsample_bytree)
    }
}

/// Discrete search space: one value list per hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchSpace {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<usize>,
    pub learning_rate: Vec<f64>,
    pub subsample: Vec<f64>,
    pub colsample_bytree: Vec<f64>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            n_estimators: vec![500, 1000, 1500],
            max_depth: vec![5, 7, 9],
            learning_rate: vec![0.01, 0.1, 0.3],
            subsample: vec![0.6, 0.8, 1.0],
            colsample_bytree: vec![0.6, 0.8, 1.0],
        }
    }
}

impl SearchSpace {
    /// Number of combinations.
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.learning_rate.len()
            * self.subsample.len()
            * self.colsample_bytree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject empty dimensions and any value that would fail validation.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidHyperParams(
                "every search dimension needs at least one value".into(),
            ));
        }
        for index in 0..self.len() {
            self.combination(index)?;
        }
        Ok(())
    }

    /// Decode a linear index (mixed radix, `n_estimators` slowest).
    pub fn combination(&self, index: usize) -> Result<HyperParams> {
        if index >= self.len() {
            return Err(Error::InvalidHyperParams(format!(
                "combination {} out of range ({} total)",
                index,
                self.len()
            )));
        }

        let mut remaining = index;
        let mut digit = |len: usize| {
            let d = remaining % len;
            remaining /= len;
            d
        };
        let colsample = self.colsample_bytree[digit(self.colsample_bytree.len())];
        let subsample = self.subsample[digit(self.subsample.len())];
        let learning_rate = self.learning_rate[digit(self.learning_rate.len())];
        let max_depth = self.max_depth[digit(self.max_depth.len())];
        let n_estimators = self.n_estimators[digit(self.n_estimators.len())];

        HyperParams::new(n_estimators, max_depth, learning_rate, subsample, colsample)
    }

    /// Every combination, in index order.
    pub fn combinations(&self) -> Result<Vec<HyperParams>> {
        (0..self.len()).map(|i| self.combination(i)).collect()
    }
}

/// Search strategy for candidate generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Full cartesian product of the space
    Grid,
    /// `n_iter` distinct combinations drawn uniformly
    #[default]
    Random,
}

/// Generate candidates from the space using the given strategy.
///
/// `n_iter` only applies to random search and is capped at the space size.
pub fn sample_candidates(
    space: &SearchSpace,
    strategy: SearchStrategy,
    n_iter: usize,
    seed: u64,
) -> Result<Vec<HyperParams>> {
    space.validate()?;

    match strategy {
        SearchStrategy::Grid => space.combinations(),
        SearchStrategy::Random => {
            let amount = n_iter.min(space.len());
            let mut rng = StdRng::seed_from_u64(seed);
            index::sample(&mut rng, space.len(), amount)
                .into_iter()
                .map(|i| space.combination(i))
                .collect()
        }
    }
}

/// Cross-validation outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: HyperParams,
    /// R² per validation fold
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// K-fold score of a single candidate on `data`.
pub fn evaluate_candidate(
    data: &Dataset,
    params: &HyperParams,
    folds: usize,
    seed: u64,
) -> CandidateScore {
    let fold_scores: Vec<f64> = kfold(data.len(), folds)
        .iter()
        .map(|(fit, validation)| {
            let train = data.subset(fit);
            let held_out = data.subset(validation);
            let model = GradientBoostedTrees::fit(&train, params, seed);
            r2_score(&held_out.targets, &model.predict_all(&held_out.rows))
        })
        .collect();

    CandidateScore {
        params: *params,
        mean_score: mean(&fold_scores),
        fold_scores,
    }
}

/// Score every candidate in parallel. Output order matches `candidates`.
pub fn cross_validate(
    data: &Dataset,
    candidates: &[HyperParams],
    folds: usize,
    seed: u64,
) -> Vec<CandidateScore> {
    candidates
        .par_iter()
        .map(|params| {
            let score = evaluate_candidate(data, params, folds, seed);
            tracing::debug!(
                stage = Stage::Training.as_str(),
                n_estimators = params.n_estimators,
                max_depth = params.max_depth,
                learning_rate = params.learning_rate,
                subsample = params.subsample,
                colsample_bytree = params.colsample_bytree,
                cv_r2 = score.mean_score,
                "candidate scored"
            );
            score
        })
        .collect()
}

/// Highest mean score; the earliest candidate wins ties.
pub fn best_candidate(scores: &[CandidateScore]) -> Option<&CandidateScore> {
    scores.iter().fold(None, |best: Option<&CandidateScore>, s| match best {
        Some(b) if b.mean_score >= s.mean_score || s.mean_score.is_nan() => Some(b),
        _ => Some(s),
    })
}

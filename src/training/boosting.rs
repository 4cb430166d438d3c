//! Gradient-boosted regression trees on squared error.
//!
//! ## Algorithm
//!
//! ```text
//! F₀(x)   = mean(y)
//! rᵢ      = yᵢ - Fₘ₋₁(xᵢ)                       residuals = negative gradients
//! hₘ      = tree grown greedily on r            (row + column subsampled)
//! Fₘ(x)   = Fₘ₋₁(x) + η · hₘ(x)
//! ```
//!
//! Trees split to maximize the regularized squared-error gain
//!
//! ```text
//! gain = G_L²/(n_L + λ) + G_R²/(n_R + λ) - G²/(n + λ)
//! ```
//!
//! where G is the residual sum of a node and λ the L2 leaf penalty. Leaves
//! output `η · G / (n + λ)`. A node stays a leaf at `max_depth`, below two
//! rows, or when no split has positive gain.
//!
//! Every random draw comes from a single RNG seeded at fit time, so a fit
//! is a pure function of (data, params, seed).

use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::types::{FEATURE_COUNT, Regressor, Row};

use super::dataset::Dataset;
use super::gridsearch::HyperParams;

/// L2 penalty on leaf weights.
const LAMBDA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single regression tree stored as a flat node arena, root at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn predict(&self, row: &Row) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] < threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Greedy depth-first tree growth over one boosting round's sample.
struct TreeBuilder<'a> {
    rows: &'a [Row],
    residuals: &'a [f64],
    features: &'a [usize],
    max_depth: usize,
    learning_rate: f64,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, sample: Vec<usize>) -> RegressionTree {
        if sample.is_empty() {
            self.nodes.push(Node::Leaf { value: 0.0 });
        } else {
            self.grow(sample, 0);
        }
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let sum: f64 = indices.iter().map(|&i| self.residuals[i]).sum();
        let node_id = self.nodes.len();

        let split = if depth < self.max_depth && indices.len() >= 2 {
            self.best_split(&indices, sum)
        } else {
            None
        };

        let Some(split) = split else {
            let value = self.learning_rate * sum / (indices.len() as f64 + LAMBDA);
            self.nodes.push(Node::Leaf { value });
            return node_id;
        };

        // Reserve the slot; children are appended after it
        self.nodes.push(Node::Leaf { value: 0.0 });

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] < split.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Exact greedy search over every allowed feature.
    fn best_split(&self, indices: &[usize], total: f64) -> Option<SplitCandidate> {
        let n = indices.len();
        let parent_score = total * total / (n as f64 + LAMBDA);
        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for &feature in self.features {
            order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.residuals[order[pos]];

                let here = self.rows[order[pos]][feature];
                let next = self.rows[order[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let left_count = pos + 1;
                let right_count = n - left_count;

                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / (left_count as f64 + LAMBDA)
                    + right_sum * right_sum / (right_count as f64 + LAMBDA)
                    - parent_score;

                if gain > best.map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// A fitted boosted-tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    params: HyperParams,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    /// Fit an ensemble. An empty dataset yields a constant-zero model.
    pub fn fit(data: &Dataset, params: &HyperParams, seed: u64) -> Self {
        let n = data.len();
        if n == 0 {
            return Self {
                params: *params,
                base_score: 0.0,
                trees: Vec::new(),
            };
        }

        let base_score = data.targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base_score; n];
        let mut residuals = vec![0.0; n];
        let mut trees = Vec::with_capacity(params.n_estimators);

        let mut rng = StdRng::seed_from_u64(seed);
        let row_count = sample_size(n, params.subsample);
        let column_count = ((FEATURE_COUNT as f64 * params.colsample_bytree).round() as usize)
            .clamp(1, FEATURE_COUNT);

        for _ in 0..params.n_estimators {
            for ((residual, target), prediction) in
                residuals.iter_mut().zip(&data.targets).zip(&predictions)
            {
                *residual = target - prediction;
            }

            let sample = draw_sorted(&mut rng, n, row_count);
            let features = draw_sorted(&mut rng, FEATURE_COUNT, column_count);

            let tree = TreeBuilder {
                rows: &data.rows,
                residuals: &residuals,
                features: &features,
                max_depth: params.max_depth,
                learning_rate: params.learning_rate,
                nodes: Vec::new(),
            }
            .build(sample);

            for (prediction, row) in predictions.iter_mut().zip(&data.rows) {
                *prediction += tree.predict(row);
            }
            trees.push(tree);
        }

        Self {
            params: *params,
            base_score,
            trees,
        }
    }

    pub fn params(&self) -> &HyperParams {
        &self.params
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn predict_all(&self, rows: &[Row]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

impl Regressor for GradientBoostedTrees {
    fn predict_row(&self, row: &Row) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}

fn sample_size(n: usize, ratio: f64) -> usize {
    ((n as f64 * ratio).ceil() as usize).clamp(1, n)
}

/// `amount` distinct positions from `0..len`, ascending. All positions
/// when `amount == len`, without consuming randomness.
fn draw_sorted<R: Rng>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    if amount >= len {
        return (0..len).collect();
    }
    let mut picked = index::sample(rng, len, amount).into_vec();
    picked.sort_unstable();
    picked
}

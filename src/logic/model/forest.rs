//! Tree-Ensemble Regressor
//!
//! A seeded random forest of variance-reducing regression trees. The
//! grade scale is ordinal, so the forest regresses the continuous grade
//! index; the classifier rounds the estimate back onto the scale.
//!
//! Each tree is fitted on a bootstrap resample with a random feature
//! subset considered per split. Everything downstream of the seed is
//! deterministic.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::grading::layout::FEATURE_COUNT;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples on each side of a split
    pub min_leaf: usize,
    /// Features considered per split
    pub features_per_split: usize,
    /// Seed for bootstrap and feature subsampling
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            min_leaf: 2,
            features_per_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// One fitted regression tree, nodes stored flat with the root at 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn fit(rows: &[[f64; FEATURE_COUNT]], labels: &[f64], config: &ForestConfig, rng: &mut StdRng) -> DecisionTree {
        let n = rows.len();
        if n == 0 {
            return DecisionTree { nodes: vec![Node::Leaf { value: 0.0 }] };
        }

        // Bootstrap resample
        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        let mut nodes = Vec::new();
        build_node(&mut nodes, rows, labels, indices, 0, config, rng);
        DecisionTree { nodes }
    }

    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut at = 0usize;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// The fitted ensemble. Plain data; persisted as a model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit the ensemble on standardized rows and their ordinal labels
    pub fn fit(rows: &[[f64; FEATURE_COUNT]], labels: &[f64], config: ForestConfig) -> RandomForest {
        let mut master = StdRng::seed_from_u64(config.seed);
        let trees = (0..config.trees)
            .map(|_| {
                let tree_seed: u64 = master.gen();
                let mut tree_rng = StdRng::seed_from_u64(tree_seed);
                DecisionTree::fit(rows, labels, &config, &mut tree_rng)
            })
            .collect();

        RandomForest { config, trees }
    }

    /// Ensemble mean of the per-tree estimates
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn mean_label(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| labels[i]).sum::<f64>() / indices.len() as f64
}

/// Grow one node, returning its index in `nodes`
fn build_node(
    nodes: &mut Vec<Node>,
    rows: &[[f64; FEATURE_COUNT]],
    labels: &[f64],
    indices: Vec<usize>,
    depth: usize,
    config: &ForestConfig,
    rng: &mut StdRng,
) -> usize {
    let value = mean_label(labels, &indices);
    let spread = indices
        .iter()
        .map(|&i| (labels[i] - value).abs())
        .fold(0.0f64, f64::max);

    if depth >= config.max_depth || indices.len() < 2 * config.min_leaf || spread < 1e-12 {
        nodes.push(Node::Leaf { value });
        return nodes.len() - 1;
    }

    let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
    features.shuffle(rng);
    features.truncate(config.features_per_split.clamp(1, FEATURE_COUNT));

    let Some((feature, threshold)) = best_split(rows, labels, &indices, &features, config.min_leaf) else {
        nodes.push(Node::Leaf { value });
        return nodes.len() - 1;
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
        indices.into_iter().partition(|&i| rows[i][feature] <= threshold);

    let at = nodes.len();
    nodes.push(Node::Leaf { value }); // placeholder until children exist
    let left = build_node(nodes, rows, labels, left_idx, depth + 1, config, rng);
    let right = build_node(nodes, rows, labels, right_idx, depth + 1, config, rng);
    nodes[at] = Node::Split { feature, threshold, left, right };
    at
}

/// Pick the (feature, threshold) minimizing summed squared error of the
/// two sides. Returns None when no split leaves `min_leaf` samples on
/// both sides.
fn best_split(
    rows: &[[f64; FEATURE_COUNT]],
    labels: &[f64],
    indices: &[usize],
    features: &[usize],
    min_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let min_leaf = min_leaf.max(1);
    let mut best: Option<(f64, usize, f64)> = None;

    for &feature in features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        // Prefix sums of labels and squared labels along the ordering
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let prefix: Vec<(f64, f64)> = order
            .iter()
            .map(|&i| {
                sum += labels[i];
                sum_sq += labels[i] * labels[i];
                (sum, sum_sq)
            })
            .collect();
        let (total, total_sq) = prefix[n - 1];

        for split in min_leaf..=(n - min_leaf) {
            let lo = rows[order[split - 1]][feature];
            let hi = rows[order[split]][feature];
            if lo == hi {
                continue;
            }

            let (left_sum, left_sq) = prefix[split - 1];
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let nl = split as f64;
            let nr = (n - split) as f64;

            let cost = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
            if best.map_or(true, |(c, _, _)| cost < c) {
                // The midpoint can round onto `hi` for adjacent floats;
                // fall back to `lo` so the right side keeps its samples
                let mut threshold = 0.5 * (lo + hi);
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some((cost, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
        // Four well-separated clusters on the first feature
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (ordinal, center) in [-3.0, -1.0, 1.0, 3.0].into_iter().enumerate() {
            for j in 0..30 {
                let jitter = (j as f64 - 15.0) / 50.0;
                rows.push([center + jitter, center / 3.0, -center]);
                labels.push(ordinal as f64);
            }
        }
        (rows, labels)
    }

    #[test]
    fn test_forest_learns_ordinal_steps() {
        let (rows, labels) = step_data();
        let forest = RandomForest::fit(&rows, &labels, ForestConfig { trees: 30, ..Default::default() });

        assert!((forest.predict(&[-3.0, -1.0, 3.0]) - 0.0).abs() < 0.3);
        assert!((forest.predict(&[-1.0, -0.33, 1.0]) - 1.0).abs() < 0.3);
        assert!((forest.predict(&[1.0, 0.33, -1.0]) - 2.0).abs() < 0.3);
        assert!((forest.predict(&[3.0, 1.0, -3.0]) - 3.0).abs() < 0.3);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (rows, labels) = step_data();
        let a = RandomForest::fit(&rows, &labels, ForestConfig { trees: 10, ..Default::default() });
        let b = RandomForest::fit(&rows, &labels, ForestConfig { trees: 10, ..Default::default() });

        for row in &rows {
            assert_eq!(a.predict(row), b.predict(row));
        }
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (rows, labels) = step_data();
        let forest = RandomForest::fit(&rows, &labels, ForestConfig { trees: 10, ..Default::default() });

        let json = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&json).unwrap();

        assert_eq!(back.tree_count(), forest.tree_count());
        for row in rows.iter().take(20) {
            assert_eq!(forest.predict(row), back.predict(row));
        }
    }

    #[test]
    fn test_constant_labels_collapse_to_leaf() {
        let rows = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        let labels = vec![2.0, 2.0, 2.0];
        let forest = RandomForest::fit(&rows, &labels, ForestConfig { trees: 5, ..Default::default() });
        assert_eq!(forest.predict(&[5.0, 5.0, 5.0]), 2.0);
    }
}

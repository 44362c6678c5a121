//! CART decision tree for binary outcomes.
//!
//! Nodes live in a flat arena indexed by position; the root is node `0`.
//! Splits send `feature <= threshold` left. Leaves keep their class counts so
//! the forest can average probabilities instead of hard votes.

use rand::seq::SliceRandom;
use rand::Rng;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or unsplittable.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features examined per split.
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        success: usize,
        total: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Borrowed view of the training matrix.
pub(crate) struct Dataset<'a> {
    pub samples: &'a [Vec<f64>],
    pub labels: &'a [bool],
    pub n_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// A fitted binary decision tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl DecisionTree {
    /// Grow a tree over the rows named by `indices` (duplicates allowed, as
    /// produced by bootstrap sampling).
    pub(crate) fn fit(
        data: &Dataset<'_>,
        indices: Vec<usize>,
        config: &TreeConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_features: data.n_features,
        };
        tree.grow(data, indices, 0, config, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &Dataset<'_>,
        indices: Vec<usize>,
        depth: usize,
        config: &TreeConfig,
        rng: &mut impl Rng,
    ) -> usize {
        let total = indices.len();
        let success = indices.iter().filter(|&&i| data.labels[i]).count();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { success, total });

        let pure = success == 0 || success == total;
        let too_deep = config.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || total < config.min_samples_split {
            return node_id;
        }

        let Some(split) = best_split(data, &indices, config.max_features, rng) else {
            return node_id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.samples[i][split.feature] <= split.threshold);

        let left = self.grow(data, left_rows, depth + 1, config, rng);
        let right = self.grow(data, right_rows, depth + 1, config, rng);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Fraction of training samples in the reached leaf that succeeded.
    pub fn success_probability(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { success, total } => {
                    return if *total == 0 {
                        0.0
                    } else {
                        *success as f64 / *total as f64
                    };
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match &self.nodes[idx] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}

fn gini(success: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = success as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Lowest weighted-Gini threshold among a random subset of features.
fn best_split(
    data: &Dataset<'_>,
    indices: &[usize],
    max_features: usize,
    rng: &mut impl Rng,
) -> Option<Split> {
    let mut candidates: Vec<usize> = (0..data.n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(max_features.clamp(1, data.n_features.max(1)));

    let total = indices.len();
    let total_success = indices.iter().filter(|&&i| data.labels[i]).count();
    let mut best: Option<Split> = None;

    for feature in candidates {
        let mut column: Vec<(f64, bool)> = indices
            .iter()
            .map(|&i| (data.samples[i][feature], data.labels[i]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_success = 0;
        for pos in 0..total - 1 {
            if column[pos].1 {
                left_success += 1;
            }
            let (value, next) = (column[pos].0, column[pos + 1].0);
            if value == next {
                continue;
            }

            let left_total = pos + 1;
            let right_total = total - left_total;
            let right_success = total_success - left_success;
            let impurity = (left_total as f64 * gini(left_success, left_total)
                + right_total as f64 * gini(right_success, right_total))
                / total as f64;

            if best.is_none_or(|b| impurity < b.impurity) {
                best = Some(Split {
                    feature,
                    threshold: value + (next - value) / 2.0,
                    impurity,
                });
            }
        }
    }

    best
}

//! Bagged decision-forest classifier.
//!
//! Each tree is grown on a bootstrap sample of the training rows and looks at
//! `ceil(sqrt(n_features))` candidate features per split. Prediction averages
//! the per-tree leaf probabilities; the label is the argmax with ties going to
//! failure.
//!
//! Randomness comes from a single [`StdRng`]. With `seed: None` it is drawn
//! from OS entropy and borderline predictions may differ between fits, so
//! tests and reproducible runs must pass a seed.

mod tree;

pub use tree::{DecisionTree, TreeConfig};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, Result};
use tree::Dataset;

/// Forest hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: None,
        }
    }
}

impl ForestConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Forest output for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestPrediction {
    pub success: bool,
    /// Mean success probability across trees.
    pub success_probability: f64,
    /// Share of the averaged probability held by the predicted class.
    pub confidence: f64,
}

/// A fitted random forest over binary labels.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit a forest on row-major `samples` against `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for an empty training set, a zero
    /// tree count, mismatched lengths, ragged rows or non-finite values.
    pub fn fit(samples: &[Vec<f64>], labels: &[bool], config: &ForestConfig) -> Result<Self> {
        if samples.is_empty() {
            return Err(CoreError::invalid_input("cannot fit on an empty training set"));
        }
        if samples.len() != labels.len() {
            return Err(CoreError::invalid_input(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if config.n_trees == 0 {
            return Err(CoreError::invalid_input("forest needs at least one tree"));
        }
        let n_features = samples[0].len();
        if n_features == 0 {
            return Err(CoreError::invalid_input("samples have no features"));
        }
        if samples.iter().any(|s| s.len() != n_features) {
            return Err(CoreError::invalid_input("inconsistent feature counts across samples"));
        }
        if samples.iter().flatten().any(|v| !v.is_finite()) {
            return Err(CoreError::invalid_input("feature values must be finite"));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let tree_config = TreeConfig {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            max_features: (n_features as f64).sqrt().ceil() as usize,
        };
        let data = Dataset {
            samples,
            labels,
            n_features,
        };

        let n = samples.len();
        let trees = (0..config.n_trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                DecisionTree::fit(&data, bootstrap, &tree_config, &mut rng)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    /// Mean success probability across all trees.
    pub fn success_probability(&self, features: &[f64]) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|t| t.success_probability(features))
            .sum();
        total / self.trees.len() as f64
    }

    pub fn predict(&self, features: &[f64]) -> ForestPrediction {
        let success_probability = self.success_probability(features);
        let success = success_probability > 0.5;
        let confidence = if success {
            success_probability
        } else {
            1.0 - success_probability
        };
        ForestPrediction {
            success,
            success_probability,
            confidence,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Average tree depth across the forest.
    pub fn avg_depth(&self) -> f64 {
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<bool>) {
        let samples = vec![
            vec![1.0],
            vec![1.0],
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![3.0],
        ];
        let labels = vec![true, true, true, false, false, false];
        (samples, labels)
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let err = RandomForest::fit(&[], &[], &ForestConfig::with_seed(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err =
            RandomForest::fit(&[vec![1.0]], &[true, false], &ForestConfig::with_seed(1))
                .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let samples = vec![vec![1.0], vec![1.0, 2.0]];
        let err = RandomForest::fit(&samples, &[true, false], &ForestConfig::with_seed(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn zero_trees_is_rejected() {
        let config = ForestConfig {
            n_trees: 0,
            ..ForestConfig::with_seed(1)
        };
        let err = RandomForest::fit(&[vec![1.0]], &[true], &config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn single_class_always_predicts_that_class() {
        let samples = vec![vec![1.0], vec![4.0]];
        let forest =
            RandomForest::fit(&samples, &[false, false], &ForestConfig::with_seed(3)).unwrap();

        let pred = forest.predict(&[10.0]);
        assert!(!pred.success);
        assert_eq!(pred.success_probability, 0.0);
        assert_eq!(pred.confidence, 1.0);
    }

    #[test]
    fn same_seed_gives_same_forest() {
        let (samples, labels) = separable();
        let a = RandomForest::fit(&samples, &labels, &ForestConfig::with_seed(42)).unwrap();
        let b = RandomForest::fit(&samples, &labels, &ForestConfig::with_seed(42)).unwrap();

        for x in 0..12 {
            let x = [x as f64];
            assert_eq!(a.success_probability(&x), b.success_probability(&x));
        }
        assert_eq!(a.total_nodes(), b.total_nodes());
    }

    #[test]
    fn learns_clearly_separated_classes() {
        let (samples, labels) = separable();
        let forest = RandomForest::fit(&samples, &labels, &ForestConfig::with_seed(42)).unwrap();

        assert!(forest.predict(&[1.0]).success);
        assert!(!forest.predict(&[3.0]).success);
        assert_eq!(forest.n_trees(), 100);
        assert_eq!(forest.n_features(), 1);
    }

    #[test]
    fn confidence_is_share_of_predicted_class() {
        let (samples, labels) = separable();
        let forest = RandomForest::fit(&samples, &labels, &ForestConfig::with_seed(9)).unwrap();

        for x in 0..6 {
            let pred = forest.predict(&[x as f64]);
            assert!(pred.confidence >= 0.5 && pred.confidence <= 1.0);
            let expected = if pred.success {
                pred.success_probability
            } else {
                1.0 - pred.success_probability
            };
            assert!((pred.confidence - expected).abs() < 1e-12);
        }
    }
}

//! Launch outcome model and its published handle.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::forest::{ForestConfig, RandomForest};
use crate::models::{OutcomeLabel, TrainingExample};

/// Predicted outcome for one payload count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub payload_count: u32,
    pub label: OutcomeLabel,
    /// Forest vote proportion behind `label`, in `[0.5, 1.0]`.
    pub confidence: f64,
    pub success_probability: f64,
}

/// Class balance of the data a model was fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub samples: usize,
    pub successes: usize,
    pub failures: usize,
}

/// Binary classifier over the payload-count feature.
///
/// Immutable once fitted. Refitting means building a new model and publishing
/// it through a [`ModelSlot`].
#[derive(Debug, Clone)]
pub struct OutcomeModel {
    forest: RandomForest,
    config: ForestConfig,
    stats: TrainingStats,
}

impl OutcomeModel {
    /// Fit a model on `training_set`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidInput`] when the training set is empty or the
    /// forest configuration is unusable.
    pub fn fit(training_set: &[TrainingExample], config: ForestConfig) -> Result<Self> {
        if training_set.is_empty() {
            return Err(CoreError::invalid_input(
                "training set has no launches with a known outcome",
            ));
        }

        let samples: Vec<Vec<f64>> = training_set
            .iter()
            .map(|e| vec![f64::from(e.payload_count)])
            .collect();
        let labels: Vec<bool> = training_set.iter().map(|e| e.outcome).collect();
        let successes = labels.iter().filter(|&&l| l).count();
        let stats = TrainingStats {
            samples: labels.len(),
            successes,
            failures: labels.len() - successes,
        };

        let forest = RandomForest::fit(&samples, &labels, &config)?;
        tracing::info!(
            samples = stats.samples,
            successes = stats.successes,
            failures = stats.failures,
            trees = forest.n_trees(),
            seed = ?config.seed,
            avg_depth = forest.avg_depth(),
            "Fitted outcome model"
        );

        Ok(Self {
            forest,
            config,
            stats,
        })
    }

    pub fn predict(&self, payload_count: u32) -> Prediction {
        let vote = self.forest.predict(&[f64::from(payload_count)]);
        Prediction {
            payload_count,
            label: OutcomeLabel::from_bool(vote.success),
            confidence: vote.confidence,
            success_probability: vote.success_probability,
        }
    }

    pub fn predict_batch(&self, payload_counts: &[u32]) -> Vec<Prediction> {
        payload_counts.iter().map(|&c| self.predict(c)).collect()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn stats(&self) -> TrainingStats {
        self.stats
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Shared handle to the currently published model.
///
/// Readers clone the inner `Arc` and never hold the lock while predicting, so
/// a refit swaps the whole model at once and in-flight requests finish on the
/// model they started with.
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    inner: Arc<RwLock<Option<Arc<OutcomeModel>>>>,
}

impl ModelSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: OutcomeModel) -> Self {
        let slot = Self::empty();
        slot.publish(model);
        slot
    }

    /// Replace the published model.
    pub fn publish(&self, model: OutcomeModel) {
        let mut guard = self.inner.write().expect("model slot lock poisoned");
        *guard = Some(Arc::new(model));
    }

    /// The published model.
    ///
    /// # Errors
    ///
    /// [`CoreError::ModelNotReady`] if nothing has been published yet.
    pub fn current(&self) -> Result<Arc<OutcomeModel>> {
        self.inner
            .read()
            .expect("model slot lock poisoned")
            .clone()
            .ok_or(CoreError::ModelNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.read().expect("model slot lock poisoned").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(payload_count: u32, outcome: bool) -> TrainingExample {
        TrainingExample {
            payload_count,
            outcome,
        }
    }

    fn seeded(training: &[TrainingExample]) -> OutcomeModel {
        OutcomeModel::fit(training, ForestConfig::with_seed(42)).unwrap()
    }

    #[test]
    fn fit_on_empty_set_is_invalid_input() {
        let err = OutcomeModel::fit(&[], ForestConfig::with_seed(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn trivially_separable_set_reproduces_success() {
        let model = seeded(&[example(1, true), example(2, false)]);
        let prediction = model.predict(1);
        // Only the bootstraps drawing the failure row twice vote failure.
        assert_eq!(prediction.label, OutcomeLabel::Success);
        assert!(prediction.success_probability > 0.5);
        assert_eq!(model.stats().samples, 2);
    }

    #[test]
    fn labels_are_binary_for_every_input() {
        let model = seeded(&[
            example(1, true),
            example(1, true),
            example(2, false),
            example(3, true),
            example(5, false),
        ]);

        for count in 0..=20 {
            let label = model.predict(count).label;
            assert!(label.as_u8() == 0 || label.as_u8() == 1);
        }
    }

    #[test]
    fn repeated_predictions_are_identical() {
        let model = seeded(&[example(1, true), example(2, false), example(3, false)]);
        let first = model.predict(2);
        for _ in 0..10 {
            assert_eq!(model.predict(2), first);
        }
    }

    #[test]
    fn batch_matches_single_predictions() {
        let model = seeded(&[example(1, true), example(4, false)]);
        let batch = model.predict_batch(&[1, 4]);
        assert_eq!(batch, vec![model.predict(1), model.predict(4)]);
    }

    #[test]
    fn empty_slot_is_not_ready() {
        let slot = ModelSlot::empty();
        assert!(!slot.is_ready());
        assert!(matches!(slot.current(), Err(CoreError::ModelNotReady)));
    }

    #[test]
    fn publish_swaps_the_model() {
        let slot = ModelSlot::with_model(seeded(&[example(1, true)]));
        let before = slot.current().unwrap();

        slot.publish(seeded(&[example(1, false)]));
        let after = slot.current().unwrap();

        assert_eq!(before.predict(1).label, OutcomeLabel::Success);
        assert_eq!(after.predict(1).label, OutcomeLabel::Failure);
    }
}

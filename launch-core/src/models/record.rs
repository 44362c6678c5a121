use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::features::payload_count;

/// A single launch, validated from the launch table.
///
/// `payloads` keeps the raw comma-delimited descriptor exactly as it was
/// stored; the numeric feature is derived on demand with [`payload_count`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub id: String,
    pub name: String,
    pub launched_at: DateTime<Utc>,
    /// `None` when the launch has not happened yet or its result is unknown.
    pub outcome: Option<bool>,
    pub rocket: String,
    pub payloads: String,
    pub launchpad: String,
}

impl LaunchRecord {
    /// Calendar year of the launch timestamp (UTC).
    pub fn year(&self) -> i32 {
        self.launched_at.year()
    }

    pub fn payload_count(&self) -> u32 {
        payload_count(&self.payloads)
    }

    /// Training pair for this record, if its outcome is known.
    pub fn training_example(&self) -> Option<TrainingExample> {
        self.outcome.map(|outcome| TrainingExample {
            payload_count: self.payload_count(),
            outcome,
        })
    }
}

/// A labelled `(feature, outcome)` pair used to fit the outcome model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub payload_count: u32,
    pub outcome: bool,
}

/// Binary launch outcome as produced by the classifier.
///
/// The numeric encoding is `Failure = 0`, `Success = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeLabel {
    Failure,
    Success,
}

impl OutcomeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Success => "success",
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Failure => 0,
            Self::Success => 1,
        }
    }

    pub fn from_bool(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<bool> for OutcomeLabel {
    fn from(success: bool) -> Self {
        Self::from_bool(success)
    }
}

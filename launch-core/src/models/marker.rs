use serde::{Deserialize, Serialize};

/// Geographic position of a launch site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Status shown on a map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    Success,
    Failure,
    Unknown,
}

impl MarkerStatus {
    pub fn from_outcome(outcome: Option<bool>) -> Self {
        match outcome {
            Some(true) => Self::Success,
            Some(false) => Self::Failure,
            None => Self::Unknown,
        }
    }

    /// Marker colour used by the map renderer.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "green",
            Self::Failure => "red",
            Self::Unknown => "gray",
        }
    }
}

/// A single launch placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub launch_id: String,
    pub name: String,
    /// Launch date, `YYYY-MM-DD`.
    pub date: String,
    pub launchpad: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: MarkerStatus,
    pub color: String,
}

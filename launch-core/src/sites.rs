//! Launch-site coordinates and map markers.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::*;

/// A known launch site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSite {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Lookup from launchpad id to site coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteDirectory {
    sites: HashMap<String, LaunchSite>,
}

impl SiteDirectory {
    /// Launchpads of the public SpaceX API.
    pub fn builtin() -> Self {
        let sites = [
            ("5e9e4502f5090995de566f86", "CCSFS SLC 40", 28.5623, -80.5774),
            ("5e9e4501f509094ba4566f84", "VAFB SLC 4E", 34.6321, -120.6106),
            ("5e9e4502f509092b78566f87", "KSC LC 39A", 28.4858, -80.5449),
            ("5e9e4502f509094188566f88", "Starbase", 25.9972, -97.1557),
        ]
        .into_iter()
        .map(|(id, name, latitude, longitude)| {
            (
                id.to_string(),
                LaunchSite {
                    name: name.to_string(),
                    latitude,
                    longitude,
                },
            )
        })
        .collect();
        Self { sites }
    }

    /// Load a directory from a JSON object keyed by launchpad id.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let directory: Self = serde_json::from_str(content)
            .map_err(|e| CoreError::invalid_input(format!("invalid site table: {e}")))?;
        if let Some((id, _)) = directory.sites.iter().find(|(_, s)| {
            !(-90.0..=90.0).contains(&s.latitude) || !(-180.0..=180.0).contains(&s.longitude)
        }) {
            return Err(CoreError::invalid_input(format!(
                "site {id} has out-of-range coordinates"
            )));
        }
        Ok(directory)
    }

    pub fn get(&self, launchpad: &str) -> Option<&LaunchSite> {
        self.sites.get(launchpad)
    }

    pub fn coordinates(&self, launchpad: &str) -> Option<Coordinates> {
        self.get(launchpad).map(|s| Coordinates {
            latitude: s.latitude,
            longitude: s.longitude,
        })
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// One marker per record at a known site, in record order. Records at
    /// unknown sites are skipped.
    pub fn markers(&self, records: &[LaunchRecord]) -> Vec<MapMarker> {
        records
            .iter()
            .filter_map(|r| {
                let at = self.coordinates(&r.launchpad)?;
                let status = MarkerStatus::from_outcome(r.outcome);
                Some(MapMarker {
                    launch_id: r.id.clone(),
                    name: r.name.clone(),
                    date: r.launched_at.format("%Y-%m-%d").to_string(),
                    launchpad: r.launchpad.clone(),
                    latitude: at.latitude,
                    longitude: at.longitude,
                    status,
                    color: status.color().to_string(),
                })
            })
            .collect()
    }
}

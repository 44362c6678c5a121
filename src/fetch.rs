//! HTTP client for the upstream launch API.
//!
//! One-shot download: the endpoint returns a JSON array of launch objects,
//! each object is validated into a [`LaunchRecord`] and the result is written
//! to the launch table. Any network, decode or validation failure aborts the
//! download; nothing is written unless every launch validates.

use std::path::Path;

use chrono::{DateTime, Utc};
use launch_core::{table, CoreError, LaunchRecord};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

/// Descriptor stored when a launch has no payload list at all.
const MISSING_PAYLOADS: &str = "None";

/// Upstream fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Upstream response is not a JSON array: {0}")]
    Decode(String),

    #[error("Launch #{index} is invalid: {message}")]
    Schema { index: usize, message: String },

    #[error("Upstream returned no launches")]
    Empty,

    #[error("Failed to write launch table: {0}")]
    Write(#[from] CoreError),
}

/// The fields of an upstream launch object that the table keeps. Other
/// fields are ignored.
#[derive(Debug, Deserialize)]
struct ApiLaunch {
    id: String,
    name: String,
    date_utc: String,
    success: Option<bool>,
    rocket: Option<String>,
    payloads: Option<Vec<String>>,
    launchpad: Option<String>,
}

impl ApiLaunch {
    fn into_record(self, index: usize) -> Result<LaunchRecord, FetchError> {
        let schema = |message: String| FetchError::Schema { index, message };

        let launched_at = DateTime::parse_from_rfc3339(&self.date_utc)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| schema(format!("invalid date_utc {:?}: {}", self.date_utc, e)))?;
        let launchpad = self
            .launchpad
            .filter(|pad| !pad.trim().is_empty())
            .ok_or_else(|| schema("missing launchpad".to_string()))?;
        let payloads = match self.payloads {
            Some(list) => list.join(","),
            None => MISSING_PAYLOADS.to_string(),
        };

        Ok(LaunchRecord {
            id: self.id,
            name: self.name,
            launched_at,
            outcome: self.success,
            rocket: self.rocket.unwrap_or_default(),
            payloads,
            launchpad,
        })
    }
}

/// Validate an upstream response body into launch records.
pub fn parse_launches(body: &str) -> Result<Vec<LaunchRecord>, FetchError> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if raw.is_empty() {
        return Err(FetchError::Empty);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<ApiLaunch>(value)
                .map_err(|e| FetchError::Schema {
                    index,
                    message: e.to_string(),
                })?
                .into_record(index)
        })
        .collect()
}

/// Client for the launch endpoint.
#[derive(Debug, Clone)]
pub struct LaunchApiClient {
    url: String,
    client: Client,
}

impl LaunchApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Download and validate every launch.
    pub async fn fetch_launches(&self) -> Result<Vec<LaunchRecord>, FetchError> {
        tracing::info!(url = %self.url, "Fetching launches");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        let records = parse_launches(&body)?;
        tracing::info!(launches = records.len(), "Fetched launches");
        Ok(records)
    }

    /// Download launches and write them to the table at `path`.
    pub async fn fetch_to_table(&self, path: &Path) -> Result<usize, FetchError> {
        let records = self.fetch_launches().await?;
        table::write_table(path, &records)?;
        Ok(records.len())
    }
}

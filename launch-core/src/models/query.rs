use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::LaunchRecord;
use crate::error::{CoreError, Result};

/// Sentinel used by selection controls to mean "every launch site".
pub const ALL_SITES: &str = "All";

/// Launch-site part of a [`FilterQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SiteSelector {
    All,
    Site(String),
}

impl SiteSelector {
    /// Interpret a raw selection. `None`, empty input and [`ALL_SITES`] all
    /// select every site.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL_SITES) => Self::All,
            Some(site) => Self::Site(site.to_string()),
        }
    }

    pub fn matches(&self, launchpad: &str) -> bool {
        match self {
            Self::All => true,
            Self::Site(site) => site == launchpad,
        }
    }
}

impl fmt::Display for SiteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SITES),
            Self::Site(site) => f.write_str(site),
        }
    }
}

impl From<String> for SiteSelector {
    fn from(raw: String) -> Self {
        Self::parse(Some(&raw))
    }
}

impl From<SiteSelector> for String {
    fn from(selector: SiteSelector) -> Self {
        selector.to_string()
    }
}

/// A year/site filter built for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub year: i32,
    pub site: SiteSelector,
}

impl FilterQuery {
    pub fn new(year: i32, site: SiteSelector) -> Self {
        Self { year, site }
    }

    /// Build a query from raw control values. A missing or non-numeric year
    /// is rejected as invalid input.
    pub fn parse(year: Option<&str>, site: Option<&str>) -> Result<Self> {
        let raw = year
            .map(str::trim)
            .filter(|y| !y.is_empty())
            .ok_or_else(|| CoreError::invalid_input("year is required"))?;
        let year = raw
            .parse::<i32>()
            .map_err(|_| CoreError::invalid_input(format!("malformed year: {raw}")))?;
        Ok(Self::new(year, SiteSelector::parse(site)))
    }
}

/// Success and failure counts over a set of records.
///
/// Records without a known outcome land in `unknown` and are excluded from
/// both `success` and `failure`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub success: usize,
    pub failure: usize,
    pub unknown: usize,
}

impl OutcomeCounts {
    pub fn known(&self) -> usize {
        self.success + self.failure
    }
}

/// Records matching a [`FilterQuery`], in table order, with their counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub query: FilterQuery,
    pub records: Vec<LaunchRecord>,
    pub success_count: usize,
    pub failure_count: usize,
    pub unknown_count: usize,
}

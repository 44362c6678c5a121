//! Dashboard views.
//!
//! The dashboard has a fixed set of views picked by one selector. [`render`]
//! maps a view plus its control values to the data that view shows; it holds
//! no presentation logic of its own.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use launch_core::{CoreError, FilterQuery, FilterResult, MapMarker, Prediction, SiteSelector};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Payload counts offered by the prediction control.
pub const PAYLOAD_RANGE: RangeInclusive<u32> = 1..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Predict,
    Data,
    Map,
}

impl View {
    pub const ALL: [View; 3] = [View::Predict, View::Data, View::Map];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predict => "predict",
            Self::Data => "data",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predict" => Ok(Self::Predict),
            "data" => Ok(Self::Data),
            "map" => Ok(Self::Map),
            other => Err(CoreError::invalid_input(format!("unknown view: {other}"))),
        }
    }
}

/// Control values a view may read. Unused fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewParams {
    pub payload_count: Option<u32>,
    pub year: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewPayload {
    Predict {
        min_payloads: u32,
        max_payloads: u32,
        /// `None` until a payload count is submitted.
        prediction: Option<Prediction>,
    },
    Data {
        years: Vec<i32>,
        sites: Vec<String>,
        /// `None` when the table has no launches to pick a year from.
        result: Option<FilterResult>,
    },
    Map {
        markers: Vec<MapMarker>,
    },
}

/// Reject payload counts outside [`PAYLOAD_RANGE`].
pub fn check_payload_count(payload_count: u32) -> launch_core::Result<u32> {
    if PAYLOAD_RANGE.contains(&payload_count) {
        Ok(payload_count)
    } else {
        Err(CoreError::invalid_input(format!(
            "payload_count must be between {} and {}, got {}",
            PAYLOAD_RANGE.start(),
            PAYLOAD_RANGE.end(),
            payload_count
        )))
    }
}

/// Data for `view` given the current control values.
///
/// The data view defaults to the earliest year when none is selected, like
/// a year picker showing its first option.
pub fn render(view: View, state: &AppState, params: &ViewParams) -> launch_core::Result<ViewPayload> {
    match view {
        View::Predict => {
            let prediction = params
                .payload_count
                .map(|count| check_payload_count(count).and_then(|c| state.predict(c)))
                .transpose()?;
            Ok(ViewPayload::Predict {
                min_payloads: *PAYLOAD_RANGE.start(),
                max_payloads: *PAYLOAD_RANGE.end(),
                prediction,
            })
        }
        View::Data => {
            let years = state.years();
            let query = match (params.year.as_deref(), years.first()) {
                (Some(year), _) => Some(FilterQuery::parse(Some(year), params.site.as_deref())?),
                (None, Some(&first)) => Some(FilterQuery::new(
                    first,
                    SiteSelector::parse(params.site.as_deref()),
                )),
                (None, None) => None,
            };
            Ok(ViewPayload::Data {
                years,
                sites: state.site_options(),
                result: query.map(|q| state.filter_and_aggregate(&q)),
            })
        }
        View::Map => Ok(ViewPayload::Map {
            markers: state.markers(),
        }),
    }
}

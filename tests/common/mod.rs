//! Shared launch fixtures for integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use launch_predictor::launch_core::LaunchRecord;

pub const SLC40: &str = "5e9e4502f5090995de566f86";
pub const VAFB: &str = "5e9e4501f509094ba4566f84";
pub const LC39A: &str = "5e9e4502f509092b78566f87";
pub const UNMAPPED_PAD: &str = "5e9e4501f5090910d4566f83";

pub fn launch(
    id: &str,
    year: i32,
    pad: &str,
    outcome: Option<bool>,
    payloads: &str,
) -> LaunchRecord {
    LaunchRecord {
        id: id.to_string(),
        name: format!("Mission {id}"),
        launched_at: Utc.with_ymd_and_hms(year, 4, 15, 10, 30, 0).unwrap(),
        outcome,
        rocket: "5e9d0d95eda69973a809d1ec".to_string(),
        payloads: payloads.to_string(),
        launchpad: pad.to_string(),
    }
}

/// Single-payload launches succeed and triple-payload launches fail, with one
/// unknown outcome in 2020 and one launch at a pad without coordinates.
pub fn launches() -> Vec<LaunchRecord> {
    vec![
        launch("a1", 2021, SLC40, Some(true), "p1"),
        launch("a2", 2020, SLC40, Some(true), "p1"),
        launch("a3", 2020, LC39A, Some(false), "p1,p2,p3"),
        launch("a4", 2020, SLC40, None, "p1,p2"),
        launch("a5", 2020, SLC40, Some(true), "p1"),
        launch("a6", 2019, VAFB, Some(false), "p1,p2,p3"),
        launch("a7", 2021, LC39A, Some(true), "p1"),
        launch("a8", 2021, VAFB, Some(false), "p1,p2,p3"),
        launch("a9", 2019, UNMAPPED_PAD, Some(true), "p1"),
        launch("a10", 2021, SLC40, Some(true), "p1"),
    ]
}

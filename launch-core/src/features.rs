//! Payload-count feature derivation.

use crate::models::{LaunchRecord, TrainingExample};

/// Number of payloads described by a comma-delimited descriptor.
///
/// Always `1 + ','-count`, so an empty or placeholder descriptor (`""`,
/// `"None"`, `"[]"`) counts as one payload, the same as a single real one.
pub fn payload_count(descriptor: &str) -> u32 {
    count_from_commas(descriptor.bytes().filter(|&b| b == b',').count())
}

fn count_from_commas(commas: usize) -> u32 {
    u32::try_from(commas).unwrap_or(u32::MAX).saturating_add(1)
}

/// Training pairs for every record with a known outcome, in table order.
pub fn training_set(records: &[LaunchRecord]) -> Vec<TrainingExample> {
    records
        .iter()
        .filter_map(LaunchRecord::training_example)
        .collect()
}

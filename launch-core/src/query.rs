//! Year/site filtering and outcome aggregation over a record snapshot.
//!
//! All functions are pure and preserve table order.

use std::collections::{BTreeSet, HashSet};

use crate::models::*;

/// Records launched in `query.year` at the selected site, in input order.
pub fn filter<'a>(records: &'a [LaunchRecord], query: &FilterQuery) -> Vec<&'a LaunchRecord> {
    records
        .iter()
        .filter(|r| r.year() == query.year && query.site.matches(&r.launchpad))
        .collect()
}

/// Success, failure and unknown-outcome counts.
///
/// Unknown outcomes count toward neither success nor failure, so
/// `success + failure` can be smaller than the number of records.
pub fn aggregate<'a, I>(records: I) -> OutcomeCounts
where
    I: IntoIterator<Item = &'a LaunchRecord>,
{
    records
        .into_iter()
        .fold(OutcomeCounts::default(), |mut counts, r| {
            match r.outcome {
                Some(true) => counts.success += 1,
                Some(false) => counts.failure += 1,
                None => counts.unknown += 1,
            }
            counts
        })
}

/// [`filter`] followed by [`aggregate`], packaged for the presentation layer.
pub fn filter_and_aggregate(records: &[LaunchRecord], query: &FilterQuery) -> FilterResult {
    let matching = filter(records, query);
    let counts = aggregate(matching.iter().copied());
    tracing::debug!(
        year = query.year,
        site = %query.site,
        matched = matching.len(),
        "Filtered launches"
    );
    FilterResult {
        query: query.clone(),
        records: matching.into_iter().cloned().collect(),
        success_count: counts.success,
        failure_count: counts.failure,
        unknown_count: counts.unknown,
    }
}

/// Distinct launch years, ascending.
pub fn list_years(records: &[LaunchRecord]) -> Vec<i32> {
    records
        .iter()
        .map(LaunchRecord::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct launch sites in first-seen order.
pub fn list_sites(records: &[LaunchRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.launchpad.as_str()))
        .map(|r| r.launchpad.clone())
        .collect()
}

/// Site choices for a selection control: [`ALL_SITES`] then [`list_sites`].
pub fn site_options(records: &[LaunchRecord]) -> Vec<String> {
    std::iter::once(ALL_SITES.to_string())
        .chain(list_sites(records))
        .collect()
}

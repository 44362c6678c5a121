//! Domain models for the launch pipeline.
//!
//! # Core Concepts
//!
//! ## Snapshot Entities
//!
//! Loaded once and never mutated afterwards:
//!
//! - [`LaunchRecord`]: One validated launch row. `outcome` is `None` for
//!   launches whose result is unknown; those rows are kept for browsing but
//!   excluded from training and from success/failure counts.
//! - [`TrainingExample`]: A `(payload_count, outcome)` pair drawn from a record
//!   with a known outcome.
//!
//! ## Per-request Entities
//!
//! Built for a single interaction and discarded:
//!
//! - [`FilterQuery`]: Year plus [`SiteSelector`].
//! - [`FilterResult`]: Matching records with their outcome counts.
//! - [`MapMarker`]: A geocoded launch for the map view.

mod marker;
mod query;
mod record;

pub use marker::*;
pub use query::*;
pub use record::*;

//! Core launch-outcome pipeline.
//!
//! Raw launch rows are validated into [`LaunchRecord`]s by [`table`], turned
//! into single-feature training pairs by [`features`], fitted by
//! [`OutcomeModel`] and queried through [`query`]. Everything here is
//! synchronous and operates on an immutable snapshot of the table.

mod error;

pub mod features;
pub mod forest;
pub mod model;
pub mod models;
pub mod query;
pub mod report;
pub mod sites;
pub mod table;

pub use error::{CoreError, Result};
pub use model::{ModelSlot, OutcomeModel, Prediction};
pub use models::*;

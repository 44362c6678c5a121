//! Application state shared by every handler.
//!
//! Built once at startup: the launch table is loaded and validated, the
//! outcome model is fitted, and the result is handed to the router. The
//! record snapshot is read-only afterwards; the model can only change by
//! publishing a freshly fitted one.

use std::sync::Arc;

use anyhow::{Context, Result};
use launch_core::forest::ForestConfig;
use launch_core::model::TrainingStats;
use launch_core::sites::SiteDirectory;
use launch_core::{
    features, query, table, FilterQuery, FilterResult, LaunchRecord, MapMarker, ModelSlot,
    OutcomeModel, Prediction,
};

use crate::config::Config;

struct Snapshot {
    records: Vec<LaunchRecord>,
    sites: SiteDirectory,
}

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<Snapshot>,
    model: ModelSlot,
    forest: ForestConfig,
}

impl AppState {
    /// Build state over `records` and fit the first model.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` when no record has a known outcome.
    pub fn new(
        records: Vec<LaunchRecord>,
        sites: SiteDirectory,
        forest: ForestConfig,
    ) -> launch_core::Result<Self> {
        let state = Self::without_model(records, sites, forest);
        let model = OutcomeModel::fit(&features::training_set(state.records()), forest)?;
        state.model.publish(model);
        Ok(state)
    }

    /// State whose model slot is still empty. Predictions fail with
    /// `ModelNotReady` until [`AppState::refit`] publishes a model.
    pub fn without_model(
        records: Vec<LaunchRecord>,
        sites: SiteDirectory,
        forest: ForestConfig,
    ) -> Self {
        Self {
            snapshot: Arc::new(Snapshot { records, sites }),
            model: ModelSlot::empty(),
            forest,
        }
    }

    /// Load the configured table and site directory, then fit.
    pub fn load(config: &Config) -> Result<Self> {
        let records = table::read_table(&config.data_path).with_context(|| {
            format!("Failed to load launch table {}", config.data_path.display())
        })?;
        let sites = config.site_directory()?;
        let forest = ForestConfig {
            n_trees: config.n_trees,
            seed: config.seed,
            ..ForestConfig::default()
        };
        Self::new(records, sites, forest).context("Failed to fit outcome model")
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.snapshot.records
    }

    pub fn sites(&self) -> &SiteDirectory {
        &self.snapshot.sites
    }

    pub fn model(&self) -> launch_core::Result<Arc<OutcomeModel>> {
        self.model.current()
    }

    pub fn model_ready(&self) -> bool {
        self.model.is_ready()
    }

    pub fn predict(&self, payload_count: u32) -> launch_core::Result<Prediction> {
        Ok(self.model()?.predict(payload_count))
    }

    pub fn filter_and_aggregate(&self, query: &FilterQuery) -> FilterResult {
        query::filter_and_aggregate(self.records(), query)
    }

    pub fn years(&self) -> Vec<i32> {
        query::list_years(self.records())
    }

    /// Site choices, starting with the "All" sentinel.
    pub fn site_options(&self) -> Vec<String> {
        query::site_options(self.records())
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        self.sites().markers(self.records())
    }

    /// Fit a new model on the snapshot and publish it. `seed` overrides the
    /// configured seed for this fit only.
    pub fn refit(&self, seed: Option<u64>) -> launch_core::Result<TrainingStats> {
        let config = ForestConfig {
            seed: seed.or(self.forest.seed),
            ..self.forest
        };
        let model = OutcomeModel::fit(&features::training_set(self.records()), config)?;
        let stats = model.stats();
        self.model.publish(model);
        tracing::info!(samples = stats.samples, seed = ?config.seed, "Published refitted model");
        Ok(stats)
    }
}

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use launch_core::model::TrainingStats;
use launch_core::{CoreError, FilterQuery, FilterResult, MapMarker, Prediction};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::views::{self, View, ViewParams, ViewPayload};

// ============================================================
// Error Handling
// ============================================================

/// Map a pipeline error to a response.
///
/// Invalid input is the caller's problem and is returned verbatim. A missing
/// model is reported as unavailable. Anything else is logged in full and
/// answered with a generic message.
fn core_error(e: CoreError) -> (StatusCode, String) {
    match e {
        CoreError::InvalidInput(msg) => {
            tracing::warn!("Invalid input: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        CoreError::ModelNotReady => {
            tracing::warn!("Prediction requested before a model was published");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                CoreError::ModelNotReady.to_string(),
            )
        }
        other => {
            tracing::error!("Internal error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_ready": state.model_ready(),
    }))
}

// ============================================================
// Prediction
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictInput {
    pub payload_count: u32,
}

/// Bodies the extractor rejects (negative, fractional or oversized counts,
/// malformed JSON) are invalid input like any other out-of-range count.
pub async fn predict(
    State(state): State<AppState>,
    input: Result<Json<PredictInput>, JsonRejection>,
) -> Result<Json<Prediction>, (StatusCode, String)> {
    let Json(input) =
        input.map_err(|rejection| core_error(CoreError::invalid_input(rejection.body_text())))?;
    views::check_payload_count(input.payload_count)
        .and_then(|count| state.predict(count))
        .map(Json)
        .map_err(core_error)
}

// ============================================================
// Launch data
// ============================================================

/// Query parameters for filtering launches.
#[derive(Debug, Deserialize)]
pub struct LaunchFilterQuery {
    /// Calendar year, required.
    pub year: Option<String>,
    /// Launchpad id or `All`. Defaults to all sites.
    pub site: Option<String>,
}

pub async fn list_launches(
    State(state): State<AppState>,
    Query(params): Query<LaunchFilterQuery>,
) -> Result<Json<FilterResult>, (StatusCode, String)> {
    let query =
        FilterQuery::parse(params.year.as_deref(), params.site.as_deref()).map_err(core_error)?;
    Ok(Json(state.filter_and_aggregate(&query)))
}

pub async fn list_years(State(state): State<AppState>) -> Json<Vec<i32>> {
    Json(state.years())
}

pub async fn list_sites(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.site_options())
}

pub async fn map_markers(State(state): State<AppState>) -> Json<Vec<MapMarker>> {
    Json(state.markers())
}

// ============================================================
// Views
// ============================================================

pub async fn get_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Query(params): Query<ViewParams>,
) -> Result<Json<ViewPayload>, (StatusCode, String)> {
    let view: View = view.parse().map_err(core_error)?;
    views::render(view, &state, &params)
        .map(Json)
        .map_err(core_error)
}

// ============================================================
// Model
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub trees: usize,
    pub seed: Option<u64>,
    pub stats: TrainingStats,
}

pub async fn get_model(
    State(state): State<AppState>,
) -> Result<Json<ModelInfo>, (StatusCode, String)> {
    let model = state.model().map_err(core_error)?;
    Ok(Json(ModelInfo {
        trees: model.forest().n_trees(),
        seed: model.config().seed,
        stats: model.stats(),
    }))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RefitInput {
    /// Seed for this fit only. Falls back to the configured seed.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Fit a replacement model and publish it. Requests already holding the old
/// model finish on it.
pub async fn refit_model(
    State(state): State<AppState>,
    Json(input): Json<RefitInput>,
) -> Result<Json<TrainingStats>, (StatusCode, String)> {
    let stats = tokio::task::spawn_blocking(move || state.refit(input.seed))
        .await
        .map_err(|e| {
            tracing::error!("Refit task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        })?
        .map_err(core_error)?;
    Ok(Json(stats))
}

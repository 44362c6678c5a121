mod handlers;

pub use handlers::{ModelInfo, PredictInput, RefitInput};

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Prediction
        .route("/predict", post(handlers::predict))
        // Launch data
        .route("/launches", get(handlers::list_launches))
        .route("/years", get(handlers::list_years))
        .route("/sites", get(handlers::list_sites))
        .route("/map/markers", get(handlers::map_markers))
        // Dashboard views
        .route("/views/{view}", get(handlers::get_view))
        // Model
        .route("/model", get(handlers::get_model))
        .route("/model/refit", post(handlers::refit_model))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

//! Health check routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::models::{HealthResponse, LivenessResponse};
use crate::api::server::AppState;

/// Create the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
}

/// Health summary with the last completed cycle.
///
/// Always answers 200: a failing storage check is reported through metrics,
/// not by failing the probe process.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.health.status().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cycles_completed: state.health.cycles_completed(),
        last_cycle: state.health.last_cycle(),
    })
}

/// Liveness check - is the process responsive?
async fn liveness_check(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

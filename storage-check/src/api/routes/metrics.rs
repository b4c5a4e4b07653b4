//! Prometheus scrape endpoint.

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::api::server::AppState;
use crate::metrics::{CONTENT_TYPE, PrometheusExporter};

/// Create the metrics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = PrometheusExporter::new(state.metrics.clone()).export();
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

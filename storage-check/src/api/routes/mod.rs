//! API route modules.

pub mod health;
pub mod metrics;

use axum::Router;

use crate::api::server::AppState;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .merge(metrics::router())
        .with_state(state)
}

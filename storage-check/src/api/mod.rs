//! HTTP surface: Prometheus metrics and health endpoints.
//!
//! Everything served here is read-only; no handler touches the cluster.

pub mod models;
pub mod routes;
mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};

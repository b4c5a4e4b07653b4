//! Response bodies.

use serde::{Deserialize, Serialize};

use crate::metrics::LastCycle;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub cycles_completed: u64,
    pub last_cycle: Option<LastCycle>,
}

/// Body of `GET /health/live`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub uptime_secs: u64,
}

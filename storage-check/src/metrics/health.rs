//! Probe health tracking.
//!
//! Remembers the most recent completed cycle so the health endpoint can
//! report it without touching the cluster.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::probe::{CycleOutcome, CyclePhase};

/// Health status derived from the last cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Last cycle succeeded.
    Healthy,
    /// Last cycle failed; the process itself is fine.
    Degraded,
    /// No cycle has completed yet.
    #[default]
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Summary of the most recent completed cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastCycle {
    pub phase: CyclePhase,
    pub duration_secs: f64,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct HealthState {
    last_cycle: Option<LastCycle>,
    cycles_completed: u64,
}

/// Tracks the outcome of completed probe cycles.
#[derive(Debug, Default)]
pub struct CycleHealth {
    state: RwLock<HealthState>,
}

impl CycleHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cycle outcome. Interrupted cycles are ignored.
    pub fn record(&self, outcome: &CycleOutcome) {
        if outcome.phase == CyclePhase::Interrupted {
            return;
        }

        let mut state = self.state.write();
        state.last_cycle = Some(LastCycle {
            phase: outcome.phase,
            duration_secs: outcome.duration_seconds(),
            finished_at: Utc::now(),
        });
        state.cycles_completed += 1;
    }

    pub fn last_cycle(&self) -> Option<LastCycle> {
        self.state.read().last_cycle.clone()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.state.read().cycles_completed
    }

    pub fn status(&self) -> HealthStatus {
        match &self.state.read().last_cycle {
            None => HealthStatus::Unknown,
            Some(last) if last.phase.is_success() => HealthStatus::Healthy,
            Some(_) => HealthStatus::Degraded,
        }
    }
}

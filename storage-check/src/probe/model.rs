//! Probe cycle data model.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cluster::ResourceKind;

/// A claim or pod created by a probe cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResource {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl ProbeResource {
    pub fn new(kind: ResourceKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for ProbeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// How a probe cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// The claim could not be created.
    ClaimFailed,
    /// The pod could not be created.
    PodSchedulingFailed,
    /// The pod ran to completion.
    PodSucceeded,
    /// The pod reached the Failed phase.
    PodFailed,
    /// The configured poll bound elapsed before a terminal phase.
    PollTimedOut,
    /// Shutdown was requested while polling; the cycle did not complete.
    Interrupted,
}

impl CyclePhase {
    pub fn is_success(self) -> bool {
        self == CyclePhase::PodSucceeded
    }

    /// Whether the phase is recorded as a check failure.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            CyclePhase::ClaimFailed
                | CyclePhase::PodSchedulingFailed
                | CyclePhase::PodFailed
                | CyclePhase::PollTimedOut
        )
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::ClaimFailed => "claim_failed",
            CyclePhase::PodSchedulingFailed => "pod_scheduling_failed",
            CyclePhase::PodSucceeded => "pod_succeeded",
            CyclePhase::PodFailed => "pod_failed",
            CyclePhase::PollTimedOut => "poll_timed_out",
            CyclePhase::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Result of one probe cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    pub phase: CyclePhase,
    /// Time from claim creation start to the terminal observation. Only
    /// meaningful for [`CyclePhase::PodSucceeded`].
    pub duration: Duration,
}

impl CycleOutcome {
    pub fn new(phase: CyclePhase, duration: Duration) -> Self {
        Self { phase, duration }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Per-pass reconciliation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupTally {
    pub deleted: u64,
    pub delete_failed: u64,
}

impl CleanupTally {
    pub fn total(&self) -> u64 {
        self.deleted + self.delete_failed
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

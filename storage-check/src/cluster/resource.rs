//! Probe resource kinds, ownership labelling and creation requests.

use std::collections::BTreeMap;
use std::fmt;


use super::ResourceClient;
use crate::error::Result;

/// Label key stamped on every object this probe creates.
pub const OWNERSHIP_LABEL_KEY: &str = "app";

/// Label value stamped on every object this probe creates.
pub const OWNERSHIP_LABEL_VALUE: &str = "storage-check";

/// Label selector matching every probe-owned object.
pub const OWNERSHIP_SELECTOR: &str = "app=storage-check";

/// Storage requested by every probe claim.
pub const CLAIM_STORAGE_REQUEST: &str = "1Gi";

/// Command run by the probe container: write a marker and read it back.
pub const PROBE_COMMAND: [&str; 3] = ["sh", "-c", "echo hello > /mnt/testfile && cat /mnt/testfile"];

/// Numeric identity the probe container runs as.
pub const PROBE_USER_ID: i64 = 1000;

/// Kind of object created by a probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A PersistentVolumeClaim.
    Claim,
    /// A Pod mounting the claim.
    Pod,
}

impl ResourceKind {
    /// Order in which a reconciliation pass sweeps kinds.
    ///
    /// Pods go first so a claim is never deleted while still mounted by a
    /// leftover pod.
    pub const SWEEP_ORDER: [ResourceKind; 2] = [ResourceKind::Pod, ResourceKind::Claim];

    /// Prefix of the server-generated object name.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ResourceKind::Claim => "storage-check-pvc-",
            ResourceKind::Pod => "storage-check-pod-",
        }
    }

    /// List names of probe-owned objects of this kind.
    pub async fn list<C>(self, client: &C, namespace: &str) -> Result<Vec<String>>
    where
        C: ResourceClient + ?Sized,
    {
        match self {
            ResourceKind::Claim => client.list_claims(namespace, OWNERSHIP_SELECTOR).await,
            ResourceKind::Pod => client.list_pods(namespace, OWNERSHIP_SELECTOR).await,
        }
    }

    /// Delete a single object of this kind.
    pub async fn delete<C>(self, client: &C, namespace: &str, name: &str) -> Result<()>
    where
        C: ResourceClient + ?Sized,
    {
        match self {
            ResourceKind::Claim => client.delete_claim(namespace, name).await,
            ResourceKind::Pod => client.delete_pod(namespace, name).await,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Claim => write!(f, "claim"),
            ResourceKind::Pod => write!(f, "pod"),
        }
    }
}

/// Observed lifecycle phase of a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Labels stamped on every probe object.
pub fn ownership_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(
        OWNERSHIP_LABEL_KEY.to_string(),
        OWNERSHIP_LABEL_VALUE.to_string(),
    )])
}

/// Request to provision a probe claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub generate_name: String,
    pub labels: BTreeMap<String, String>,
    pub storage_class: String,
    pub storage: String,
}

impl ClaimRequest {
    pub fn new(storage_class: impl Into<String>) -> Self {
        Self {
            generate_name: ResourceKind::Claim.name_prefix().to_string(),
            labels: ownership_labels(),
            storage_class: storage_class.into(),
            storage: CLAIM_STORAGE_REQUEST.to_string(),
        }
    }
}

/// Request to schedule a probe pod mounting an existing claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRequest {
    pub generate_name: String,
    pub labels: BTreeMap<String, String>,
    pub image: String,
    pub claim_name: String,
    pub command: Vec<String>,
    pub run_as: i64,
}

impl PodRequest {
    pub fn new(image: impl Into<String>, claim_name: impl Into<String>) -> Self {
        Self {
            generate_name: ResourceKind::Pod.name_prefix().to_string(),
            labels: ownership_labels(),
            image: image.into(),
            claim_name: claim_name.into(),
            command: PROBE_COMMAND.iter().map(|s| s.to_string()).collect(),
            run_as: PROBE_USER_ID,
        }
    }
}

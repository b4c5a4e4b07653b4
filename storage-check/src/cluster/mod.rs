//! Cluster resource client.
//!
//! A narrow facade over the Kubernetes API covering the calls a probe cycle
//! needs: create/get/delete for claims and pods, and label-selector listing.

mod kube_client;
pub mod manifest;
mod resource;

use async_trait::async_trait;

use crate::error::Result;

pub use kube_client::KubeResourceClient;
pub use resource::{
    CLAIM_STORAGE_REQUEST, ClaimRequest, OWNERSHIP_LABEL_KEY, OWNERSHIP_LABEL_VALUE,
    OWNERSHIP_SELECTOR, PROBE_COMMAND, PROBE_USER_ID, PodPhase, PodRequest, ResourceKind,
    ownership_labels,
};

/// Create/get/delete/list operations on probe claims and pods.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Create a claim and return its server-assigned name.
    async fn create_claim(&self, namespace: &str, request: &ClaimRequest) -> Result<String>;

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()>;

    /// Create a pod and return its server-assigned name.
    async fn create_pod(&self, namespace: &str, request: &PodRequest) -> Result<String>;

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()>;

    /// Fetch the pod's current phase.
    async fn get_pod_phase(&self, namespace: &str, name: &str) -> Result<PodPhase>;

    /// Names of claims in `namespace` matching `label_selector`.
    async fn list_claims(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>>;

    /// Names of pods in `namespace` matching `label_selector`.
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>>;
}

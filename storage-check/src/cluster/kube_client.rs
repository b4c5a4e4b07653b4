//! [`ResourceClient`] backed by the Kubernetes API.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};
use tracing::debug;

use super::manifest::{claim_manifest, pod_manifest};
use super::{ClaimRequest, PodPhase, PodRequest, ResourceClient, ResourceKind};
use crate::error::{Error, Result};

/// Resource client talking to a live cluster through kube-rs.
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from in-cluster configuration or the local kubeconfig.
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    /// Namespace the underlying client defaults to.
    pub fn default_namespace(&self) -> &str {
        self.client.default_namespace()
    }

    fn claims(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn create_claim(&self, namespace: &str, request: &ClaimRequest) -> Result<String> {
        let created = self
            .claims(namespace)
            .create(&PostParams::default(), &claim_manifest(request))
            .await?;
        let name = created
            .metadata
            .name
            .ok_or_else(|| Error::missing_name(ResourceKind::Claim))?;
        debug!(namespace, name = %name, "Created claim");
        Ok(name)
    }

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()> {
        self.claims(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn create_pod(&self, namespace: &str, request: &PodRequest) -> Result<String> {
        let created = self
            .pods(namespace)
            .create(&PostParams::default(), &pod_manifest(request))
            .await?;
        let name = created
            .metadata
            .name
            .ok_or_else(|| Error::missing_name(ResourceKind::Pod))?;
        debug!(namespace, name = %name, "Created pod");
        Ok(name)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        self.pods(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn get_pod_phase(&self, namespace: &str, name: &str) -> Result<PodPhase> {
        let pod = self.pods(namespace).get(name).await?;
        Ok(pod
            .status
            .and_then(|status| status.phase)
            .map(|phase| PodPhase::from(phase.as_str()))
            .unwrap_or(PodPhase::Unknown))
    }

    async fn list_claims(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>> {
        let list = self
            .claims(namespace)
            .list(&ListParams::default().labels(label_selector))
            .await?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|claim| claim.metadata.name)
            .collect())
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>> {
        let list = self
            .pods(namespace)
            .list(&ListParams::default().labels(label_selector))
            .await?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|pod| pod.metadata.name)
            .collect())
    }
}

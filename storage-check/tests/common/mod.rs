//! In-memory cluster used by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use storage_check::cluster::{
    ClaimRequest, OWNERSHIP_SELECTOR, PodPhase, PodRequest, ResourceClient, ResourceKind,
    ownership_labels,
};
use storage_check::metrics::{CycleHealth, MetricsCollector};
use storage_check::probe::{CheckOrchestrator, CycleDriver, PollPolicy, ProbeSettings, Reconciler};
use storage_check::{Error, Result};

pub const NAMESPACE: &str = "storage-probes";

#[derive(Debug, Clone)]
struct StoredObject {
    kind: ResourceKind,
    namespace: String,
    name: String,
    labels: BTreeMap<String, String>,
}

#[derive(Default)]
struct State {
    objects: Vec<StoredObject>,
    next_id: u64,
    pods_created: Vec<PodRequest>,
    claims_created: Vec<ClaimRequest>,
    phases: VecDeque<PodPhase>,
    reject_claims: bool,
    reject_pods: bool,
    reject_deletes: bool,
}

/// Label-aware fake of the cluster API.
///
/// Pod phases are served from a script; the last scripted phase repeats once
/// the script is exhausted, and an empty script reports `Pending`.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_phases(&self, phases: impl IntoIterator<Item = PodPhase>) {
        self.state.lock().phases = phases.into_iter().collect();
    }

    pub fn reject_claims(&self) {
        self.state.lock().reject_claims = true;
    }

    pub fn reject_pods(&self) {
        self.state.lock().reject_pods = true;
    }

    pub fn reject_deletes(&self) {
        self.state.lock().reject_deletes = true;
    }

    /// Insert an owned object as if left behind by a crashed run.
    pub fn seed(&self, kind: ResourceKind, namespace: &str) -> String {
        Self::insert(&mut self.state.lock(), kind, namespace, ownership_labels())
    }

    /// Insert an object that does not carry the ownership label.
    pub fn seed_foreign(&self, kind: ResourceKind, namespace: &str) -> String {
        let mut state = self.state.lock();
        let labels = BTreeMap::from([("app".to_string(), "someone-else".to_string())]);
        Self::insert(&mut state, kind, namespace, labels)
    }

    /// Number of owned objects of `kind` left in `namespace`.
    pub fn owned(&self, kind: ResourceKind, namespace: &str) -> usize {
        self.matching(kind, namespace, OWNERSHIP_SELECTOR).len()
    }

    pub fn total_objects(&self) -> usize {
        self.state.lock().objects.len()
    }

    pub fn pods_created(&self) -> Vec<PodRequest> {
        self.state.lock().pods_created.clone()
    }

    pub fn claims_created(&self) -> Vec<ClaimRequest> {
        self.state.lock().claims_created.clone()
    }

    fn insert(
        state: &mut State,
        kind: ResourceKind,
        namespace: &str,
        labels: BTreeMap<String, String>,
    ) -> String {
        state.next_id += 1;
        let name = format!("{}{:05}", kind.name_prefix(), state.next_id);
        state.objects.push(StoredObject {
            kind,
            namespace: namespace.to_string(),
            name: name.clone(),
            labels,
        });
        name
    }

    fn matching(&self, kind: ResourceKind, namespace: &str, selector: &str) -> Vec<String> {
        let (key, value) = selector.split_once('=').unwrap_or((selector, ""));
        self.state
            .lock()
            .objects
            .iter()
            .filter(|o| o.kind == kind && o.namespace == namespace)
            .filter(|o| o.labels.get(key).map(String::as_str) == Some(value))
            .map(|o| o.name.clone())
            .collect()
    }

    fn remove(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_deletes {
            return Err(Error::ApiError(format!("delete of {kind} {name} rejected")));
        }
        let before = state.objects.len();
        state
            .objects
            .retain(|o| !(o.kind == kind && o.namespace == namespace && o.name == name));
        if state.objects.len() == before {
            return Err(Error::ApiError(format!("{kind} {name} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for FakeCluster {
    async fn create_claim(&self, namespace: &str, request: &ClaimRequest) -> Result<String> {
        let mut state = self.state.lock();
        if state.reject_claims {
            return Err(Error::ApiError(format!(
                "storage class {} not found",
                request.storage_class
            )));
        }
        state.claims_created.push(request.clone());
        Ok(Self::insert(
            &mut state,
            ResourceKind::Claim,
            namespace,
            request.labels.clone(),
        ))
    }

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()> {
        self.remove(ResourceKind::Claim, namespace, name)
    }

    async fn create_pod(&self, namespace: &str, request: &PodRequest) -> Result<String> {
        let mut state = self.state.lock();
        if state.reject_pods {
            return Err(Error::ApiError("pod admission denied".to_string()));
        }
        state.pods_created.push(request.clone());
        Ok(Self::insert(
            &mut state,
            ResourceKind::Pod,
            namespace,
            request.labels.clone(),
        ))
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        self.remove(ResourceKind::Pod, namespace, name)
    }

    async fn get_pod_phase(&self, _namespace: &str, _name: &str) -> Result<PodPhase> {
        let mut state = self.state.lock();
        let phase = if state.phases.len() > 1 {
            state.phases.pop_front()
        } else {
            state.phases.front().copied()
        };
        Ok(phase.unwrap_or(PodPhase::Pending))
    }

    async fn list_claims(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>> {
        Ok(self.matching(ResourceKind::Claim, namespace, label_selector))
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<String>> {
        Ok(self.matching(ResourceKind::Pod, namespace, label_selector))
    }
}

pub fn settings() -> ProbeSettings {
    ProbeSettings {
        namespace: NAMESPACE.to_string(),
        storage_class: "local-path".to_string(),
        image: "busybox:1.36".to_string(),
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: std::time::Duration::from_millis(10),
        timeout: None,
    }
}

pub fn orchestrator(
    cluster: &Arc<FakeCluster>,
    metrics: &Arc<MetricsCollector>,
) -> CheckOrchestrator<FakeCluster> {
    CheckOrchestrator::new(cluster.clone(), metrics.clone(), settings(), fast_poll())
}

pub fn reconciler(
    cluster: &Arc<FakeCluster>,
    metrics: &Arc<MetricsCollector>,
) -> Reconciler<FakeCluster> {
    Reconciler::new(cluster.clone(), metrics.clone())
}

pub fn driver(
    cluster: &Arc<FakeCluster>,
    metrics: &Arc<MetricsCollector>,
    health: &Arc<CycleHealth>,
) -> CycleDriver<FakeCluster> {
    CycleDriver::new(
        cluster.clone(),
        metrics.clone(),
        health.clone(),
        settings(),
        fast_poll(),
        std::time::Duration::from_secs(60),
    )
}

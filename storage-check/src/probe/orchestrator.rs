//! Probe cycle orchestration.
//!
//! One cycle provisions a claim, schedules a pod that writes to it, waits for
//! the pod to reach a terminal phase and records the outcome. Every resource
//! the cycle creates is deleted before the cycle returns, whichever way it
//! ends; anything missed (e.g. the process dying mid-poll) is left to the
//! next reconciliation pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::model::{CycleOutcome, CyclePhase, ProbeResource};
use crate::cluster::{ClaimRequest, PodPhase, PodRequest, ResourceClient, ResourceKind};
use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::metrics::MetricsCollector;

/// Where and what to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub namespace: String,
    pub storage_class: String,
    pub image: String,
}

/// How the pod phase is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between phase fetches.
    pub interval: Duration,
    /// Upper bound on the whole poll. `None` polls until a terminal phase.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: None,
        }
    }
}

/// Runs probe cycles against a cluster.
pub struct CheckOrchestrator<C: ?Sized> {
    client: Arc<C>,
    metrics: Arc<MetricsCollector>,
    settings: ProbeSettings,
    poll: PollPolicy,
}

impl<C> CheckOrchestrator<C>
where
    C: ResourceClient + ?Sized,
{
    pub fn new(
        client: Arc<C>,
        metrics: Arc<MetricsCollector>,
        settings: ProbeSettings,
        poll: PollPolicy,
    ) -> Self {
        Self {
            client,
            metrics,
            settings,
            poll,
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Run one probe cycle to completion.
    ///
    /// Exactly one of the check success/failure counters moves per completed
    /// cycle; an interrupted cycle moves neither. Created resources are
    /// released before returning.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let mut acquired = Vec::with_capacity(2);

        let outcome = self.provision_and_observe(&mut acquired, cancel).await;
        self.record(&outcome);
        self.release(acquired).await;

        outcome
    }

    async fn provision_and_observe(
        &self,
        acquired: &mut Vec<ProbeResource>,
        cancel: &CancellationToken,
    ) -> CycleOutcome {
        let namespace = self.settings.namespace.as_str();
        let started = Instant::now();

        let claim_request = ClaimRequest::new(&self.settings.storage_class);
        let claim_name = match self.client.create_claim(namespace, &claim_request).await {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    namespace,
                    storage_class = %self.settings.storage_class,
                    error = %e,
                    "Failed to create probe claim"
                );
                return CycleOutcome::new(CyclePhase::ClaimFailed, started.elapsed());
            }
        };
        acquired.push(ProbeResource::new(ResourceKind::Claim, &claim_name, namespace));

        let pod_request = PodRequest::new(&self.settings.image, &claim_name);
        let pod_name = match self.client.create_pod(namespace, &pod_request).await {
            Ok(name) => name,
            Err(e) => {
                warn!(namespace, claim = %claim_name, error = %e, "Failed to create probe pod");
                return CycleOutcome::new(CyclePhase::PodSchedulingFailed, started.elapsed());
            }
        };
        acquired.push(ProbeResource::new(ResourceKind::Pod, &pod_name, namespace));

        let phase = self.wait_for_terminal_phase(&pod_name, cancel).await;
        CycleOutcome::new(phase, started.elapsed())
    }

    async fn wait_for_terminal_phase(&self, pod_name: &str, cancel: &CancellationToken) -> CyclePhase {
        let namespace = self.settings.namespace.as_str();
        let deadline = self.poll.timeout.map(|timeout| Instant::now() + timeout);

        loop {
            match self.client.get_pod_phase(namespace, pod_name).await {
                Ok(PodPhase::Succeeded) => return CyclePhase::PodSucceeded,
                Ok(PodPhase::Failed) => return CyclePhase::PodFailed,
                Ok(phase) => trace!(namespace, pod = pod_name, %phase, "Probe pod not terminal yet"),
                // Not distinguished from a pod that does not exist (yet).
                Err(e) => debug!(namespace, pod = pod_name, error = %e, "Failed to fetch probe pod phase"),
            }

            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                warn!(namespace, pod = pod_name, "Probe pod did not finish before the poll timeout");
                return CyclePhase::PollTimedOut;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(namespace, pod = pod_name, "Shutdown requested while polling probe pod");
                    return CyclePhase::Interrupted;
                }
                _ = tokio::time::sleep(self.poll.interval) => {}
            }
        }
    }

    fn record(&self, outcome: &CycleOutcome) {
        let phase = outcome.phase;
        if phase.is_success() {
            self.metrics.record_check_success(outcome.duration);
            info!(
                namespace = %self.settings.namespace,
                duration_secs = outcome.duration_seconds(),
                "Storage check succeeded"
            );
        } else if phase.is_failure() {
            self.metrics.record_check_failure();
            warn!(namespace = %self.settings.namespace, %phase, "Storage check failed");
        }
    }

    /// Delete acquired resources, most recent first. Failures are left for
    /// the next reconciliation pass.
    async fn release(&self, acquired: Vec<ProbeResource>) {
        for resource in acquired.into_iter().rev() {
            match resource
                .kind
                .delete(self.client.as_ref(), &resource.namespace, &resource.name)
                .await
            {
                Ok(()) => debug!(%resource, "Released probe resource"),
                Err(e) => warn!(%resource, error = %e, "Failed to release probe resource"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::cluster::MockResourceClient;
    use crate::error::Error;

    fn settings() -> ProbeSettings {
        ProbeSettings {
            namespace: "probes".to_string(),
            storage_class: "local-path".to_string(),
            image: "busybox".to_string(),
        }
    }

    fn orchestrator(
        client: MockResourceClient,
        poll: PollPolicy,
    ) -> (CheckOrchestrator<MockResourceClient>, Arc<MetricsCollector>) {
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let orchestrator = CheckOrchestrator::new(Arc::new(client), metrics.clone(), settings(), poll);
        (orchestrator, metrics)
    }

    #[tokio::test]
    async fn test_claim_failure_creates_no_pod() {
        let mut client = MockResourceClient::new();
        client
            .expect_create_claim()
            .times(1)
            .returning(|_, _| Err(Error::other("storageclass not found")));
        client.expect_create_pod().never();
        client.expect_delete_pod().never();
        client.expect_delete_claim().never();

        let (orchestrator, metrics) = orchestrator(client, PollPolicy::default());
        let outcome = orchestrator.run_cycle(&CancellationToken::new()).await;

        assert_eq!(outcome.phase, CyclePhase::ClaimFailed);
        assert_eq!(metrics.check_failure(), 1);
        assert_eq!(metrics.check_success(), 0);
        assert_eq!(metrics.check_duration_samples(), 0);
    }

    #[tokio::test]
    async fn test_pod_failure_releases_claim() {
        let mut client = MockResourceClient::new();
        client
            .expect_create_claim()
            .withf(|ns, req| ns == "probes" && req.storage_class == "local-path")
            .returning(|_, _| Ok("storage-check-pvc-a".into()));
        client
            .expect_create_pod()
            .withf(|_, req| req.claim_name == "storage-check-pvc-a" && req.image == "busybox")
            .returning(|_, _| Err(Error::other("quota exceeded")));
        client.expect_delete_pod().never();
        client
            .expect_delete_claim()
            .with(eq("probes"), eq("storage-check-pvc-a"))
            .times(1)
            .returning(|_, _| Ok(()));

        let (orchestrator, metrics) = orchestrator(client, PollPolicy::default());
        let outcome = orchestrator.run_cycle(&CancellationToken::new()).await;

        assert_eq!(outcome.phase, CyclePhase::PodSchedulingFailed);
        assert_eq!(metrics.check_failure(), 1);
        assert_eq!(metrics.check_success(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tolerates_fetch_errors_and_releases_pod_first() {
        let mut client = MockResourceClient::new();
        let mut seq = Sequence::new();

        client
            .expect_create_claim()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("claim-1".into()));
        client
            .expect_create_pod()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("pod-1".into()));

        let mut fetches = 0;
        client
            .expect_get_pod_phase()
            .with(eq("probes"), eq("pod-1"))
            .times(4)
            .in_sequence(&mut seq)
            .returning(move |_, _| {
                fetches += 1;
                match fetches {
                    1 => Ok(PodPhase::Pending),
                    2 => Err(Error::other("connection reset")),
                    3 => Ok(PodPhase::Running),
                    _ => Ok(PodPhase::Succeeded),
                }
            });
        client
            .expect_delete_pod()
            .with(eq("probes"), eq("pod-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        client
            .expect_delete_claim()
            .with(eq("probes"), eq("claim-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (orchestrator, metrics) = orchestrator(client, PollPolicy::default());
        let outcome = orchestrator.run_cycle(&CancellationToken::new()).await;

        assert_eq!(outcome.phase, CyclePhase::PodSucceeded);
        assert!(outcome.duration >= Duration::from_secs(6));
        assert!(outcome.duration < Duration::from_secs(7));
        assert_eq!(metrics.check_success(), 1);
        assert_eq!(metrics.check_failure(), 0);
        assert_eq!(metrics.check_duration_samples(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_errors_are_tolerated() {
        let mut client = MockResourceClient::new();
        client.expect_create_claim().returning(|_, _| Ok("c".into()));
        client.expect_create_pod().returning(|_, _| Ok("p".into()));
        client
            .expect_get_pod_phase()
            .returning(|_, _| Ok(PodPhase::Failed));
        client
            .expect_delete_pod()
            .times(1)
            .returning(|_, _| Err(Error::other("forbidden")));
        client
            .expect_delete_claim()
            .times(1)
            .returning(|_, _| Err(Error::other("forbidden")));

        let (orchestrator, metrics) = orchestrator(client, PollPolicy::default());
        let outcome = orchestrator.run_cycle(&CancellationToken::new()).await;

        assert_eq!(outcome.phase, CyclePhase::PodFailed);
        assert_eq!(metrics.check_failure(), 1);
        assert_eq!(metrics.cleanup_failure(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_timeout_counts_as_failure() {
        let mut client = MockResourceClient::new();
        client.expect_create_claim().returning(|_, _| Ok("c".into()));
        client.expect_create_pod().returning(|_, _| Ok("p".into()));
        client
            .expect_get_pod_phase()
            .with(always(), always())
            .returning(|_, _| Ok(PodPhase::Pending));
        client.expect_delete_pod().times(1).returning(|_, _| Ok(()));
        client.expect_delete_claim().times(1).returning(|_, _| Ok(()));

        let poll = PollPolicy {
            interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(10)),
        };
        let (orchestrator, metrics) = orchestrator(client, poll);
        let outcome = orchestrator.run_cycle(&CancellationToken::new()).await;

        assert_eq!(outcome.phase, CyclePhase::PollTimedOut);
        assert_eq!(metrics.check_failure(), 1);
        assert_eq!(metrics.check_duration_samples(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_poll_and_still_releases() {
        let mut client = MockResourceClient::new();
        client.expect_create_claim().returning(|_, _| Ok("c".into()));
        client.expect_create_pod().returning(|_, _| Ok("p".into()));
        client
            .expect_get_pod_phase()
            .returning(|_, _| Ok(PodPhase::Running));
        client.expect_delete_pod().times(1).returning(|_, _| Ok(()));
        client.expect_delete_claim().times(1).returning(|_, _| Ok(()));

        let (orchestrator, metrics) = orchestrator(client, PollPolicy::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = orchestrator.run_cycle(&cancel).await;

        assert_eq!(outcome.phase, CyclePhase::Interrupted);
        assert_eq!(metrics.check_success(), 0);
        assert_eq!(metrics.check_failure(), 0);
    }
}

//! Interval loop driving reconciliation and probe cycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::model::CycleOutcome;
use super::orchestrator::{CheckOrchestrator, PollPolicy, ProbeSettings};
use super::reconciler::Reconciler;
use crate::cluster::ResourceClient;
use crate::metrics::{CycleHealth, MetricsCollector};

/// Runs a reconciliation pass followed by a probe cycle once per interval.
///
/// Cycles never overlap: the next tick is only awaited after the current
/// cycle, including its poll, has returned.
pub struct CycleDriver<C: ?Sized> {
    reconciler: Reconciler<C>,
    orchestrator: CheckOrchestrator<C>,
    health: Arc<CycleHealth>,
    interval: Duration,
}

impl<C> CycleDriver<C>
where
    C: ResourceClient + ?Sized,
{
    pub fn new(
        client: Arc<C>,
        metrics: Arc<MetricsCollector>,
        health: Arc<CycleHealth>,
        settings: ProbeSettings,
        poll: PollPolicy,
        interval: Duration,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(client.clone(), metrics.clone()),
            orchestrator: CheckOrchestrator::new(client, metrics, settings, poll),
            health,
            interval,
        }
    }

    /// Sweep leftovers, then run one probe cycle.
    pub async fn run_once(&self, cancel: &CancellationToken) -> CycleOutcome {
        let namespace = self.orchestrator.settings().namespace.as_str();

        let tally = self.reconciler.reconcile(namespace).await;
        debug!(
            namespace,
            deleted = tally.deleted,
            failed = tally.delete_failed,
            "Reconciliation pass finished"
        );

        let outcome = self.orchestrator.run_cycle(cancel).await;
        self.health.record(&outcome);
        outcome
    }

    /// Run cycles until `cancel` fires. The first cycle starts immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let settings = self.orchestrator.settings();
        info!(
            namespace = %settings.namespace,
            storage_class = %settings.storage_class,
            image = %settings.image,
            interval_secs = self.interval.as_secs(),
            "Starting storage check loop"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_once(&cancel).await;
        }

        info!("Storage check loop stopped");
    }
}

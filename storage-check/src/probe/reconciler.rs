//! Leftover resource sweep.
//!
//! Deletes every probe-owned pod and claim in a namespace, regardless of
//! which cycle created it. Runs before each cycle so resources leaked by a
//! crashed process do not accumulate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::model::CleanupTally;
use crate::cluster::{ResourceClient, ResourceKind};
use crate::metrics::MetricsCollector;

/// Sweeps probe-owned resources left behind by earlier cycles.
pub struct Reconciler<C: ?Sized> {
    client: Arc<C>,
    metrics: Arc<MetricsCollector>,
}

impl<C> Reconciler<C>
where
    C: ResourceClient + ?Sized,
{
    pub fn new(client: Arc<C>, metrics: Arc<MetricsCollector>) -> Self {
        Self { client, metrics }
    }

    /// Delete every probe-owned pod and claim in `namespace`.
    ///
    /// Each delete increments the cleanup success or failure counter. A kind
    /// whose listing fails is skipped for this pass without counting.
    pub async fn reconcile(&self, namespace: &str) -> CleanupTally {
        let mut tally = CleanupTally::default();

        for kind in ResourceKind::SWEEP_ORDER {
            self.sweep(kind, namespace, &mut tally).await;
        }

        if !tally.is_empty() {
            info!(
                namespace,
                deleted = tally.deleted,
                failed = tally.delete_failed,
                "Cleaned up leftover probe resources"
            );
        }

        tally
    }

    async fn sweep(&self, kind: ResourceKind, namespace: &str, tally: &mut CleanupTally) {
        let names = match kind.list(self.client.as_ref(), namespace).await {
            Ok(names) => names,
            Err(e) => {
                warn!(namespace, %kind, error = %e, "Failed to list leftover resources, skipping");
                return;
            }
        };

        for name in names {
            match kind.delete(self.client.as_ref(), namespace, &name).await {
                Ok(()) => {
                    debug!(namespace, %kind, name = %name, "Deleted leftover resource");
                    self.metrics.record_cleanup_success();
                    tally.deleted += 1;
                }
                Err(e) => {
                    warn!(namespace, %kind, name = %name, error = %e, "Failed to delete leftover resource");
                    self.metrics.record_cleanup_failure();
                    tally.delete_failed += 1;
                }
            }
        }
    }
}

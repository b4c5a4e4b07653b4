mod common;

use std::sync::Arc;

use storage_check::cluster::ResourceKind;
use storage_check::metrics::MetricsCollector;

use common::{FakeCluster, NAMESPACE};

fn seed_crash_leftovers(cluster: &FakeCluster, pods: usize, claims: usize) {
    for _ in 0..pods {
        cluster.seed(ResourceKind::Pod, NAMESPACE);
    }
    for _ in 0..claims {
        cluster.seed(ResourceKind::Claim, NAMESPACE);
    }
}

#[tokio::test]
async fn test_leftover_sweep() {
    let cluster = FakeCluster::new();
    seed_crash_leftovers(&cluster, 2, 2);
    let metrics = Arc::new(MetricsCollector::new().unwrap());

    let tally = common::reconciler(&cluster, &metrics)
        .reconcile(NAMESPACE)
        .await;

    assert_eq!(tally.deleted, 4);
    assert_eq!(tally.delete_failed, 0);
    assert_eq!(metrics.cleanup_success(), 4);
    assert_eq!(metrics.cleanup_failure(), 0);
    assert_eq!(cluster.owned(ResourceKind::Pod, NAMESPACE), 0);
    assert_eq!(cluster.owned(ResourceKind::Claim, NAMESPACE), 0);
}

#[tokio::test]
async fn test_sweep_is_complete_for_any_mix() {
    for (pods, claims) in [(0, 3), (5, 0), (3, 7)] {
        let cluster = FakeCluster::new();
        seed_crash_leftovers(&cluster, pods, claims);
        let metrics = Arc::new(MetricsCollector::new().unwrap());

        common::reconciler(&cluster, &metrics)
            .reconcile(NAMESPACE)
            .await;

        assert_eq!(metrics.cleanup_success(), (pods + claims) as u64);
        assert_eq!(cluster.total_objects(), 0);
    }
}

#[tokio::test]
async fn test_second_pass_is_a_no_op() {
    let cluster = FakeCluster::new();
    seed_crash_leftovers(&cluster, 1, 3);
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let reconciler = common::reconciler(&cluster, &metrics);

    reconciler.reconcile(NAMESPACE).await;
    let first = metrics.snapshot();

    let tally = reconciler.reconcile(NAMESPACE).await;

    assert!(tally.is_empty());
    assert_eq!(metrics.snapshot(), first);
}

#[tokio::test]
async fn test_only_owned_resources_in_namespace_are_swept() {
    let cluster = FakeCluster::new();
    seed_crash_leftovers(&cluster, 1, 1);
    cluster.seed_foreign(ResourceKind::Pod, NAMESPACE);
    cluster.seed(ResourceKind::Claim, "other-namespace");
    let metrics = Arc::new(MetricsCollector::new().unwrap());

    common::reconciler(&cluster, &metrics)
        .reconcile(NAMESPACE)
        .await;

    assert_eq!(metrics.cleanup_success(), 2);
    assert_eq!(cluster.total_objects(), 2);
    assert_eq!(cluster.owned(ResourceKind::Claim, "other-namespace"), 1);
}

#[tokio::test]
async fn test_delete_failures_are_counted_per_object() {
    let cluster = FakeCluster::new();
    seed_crash_leftovers(&cluster, 2, 1);
    cluster.reject_deletes();
    let metrics = Arc::new(MetricsCollector::new().unwrap());

    let tally = common::reconciler(&cluster, &metrics)
        .reconcile(NAMESPACE)
        .await;

    assert_eq!(tally.delete_failed, 3);
    assert_eq!(metrics.cleanup_failure(), 3);
    assert_eq!(metrics.cleanup_success(), 0);
    assert_eq!(cluster.owned(ResourceKind::Pod, NAMESPACE), 2);
}

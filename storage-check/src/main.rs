use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use storage_check::api::{ApiServer, AppState};
use storage_check::cluster::KubeResourceClient;
use storage_check::config::ProbeConfig;
use storage_check::metrics::{CycleHealth, MetricsCollector};
use storage_check::probe::{CycleDriver, ProbeSettings};
use storage_check::{logging, panic_hook};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_dir = logging::log_dir_from_env();
    let logging = logging::init_logging(log_dir.as_deref())?;
    panic_hook::install(logging.log_dir());

    let config = ProbeConfig::from_env_or_default();

    let cancel = CancellationToken::new();
    logging.start_retention_cleanup(cancel.clone());

    let client = KubeResourceClient::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let namespace = config
        .namespace
        .clone()
        .unwrap_or_else(|| client.default_namespace().to_string());

    let metrics = Arc::new(MetricsCollector::new()?);
    let health = Arc::new(CycleHealth::new());

    let server = ApiServer::new(
        config.server.clone(),
        AppState::new(metrics.clone(), health.clone()),
        cancel.clone(),
    );
    let server_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let result = server.run().await;
            if let Err(e) = &result {
                error!(error = %e, "Metrics server failed");
                cancel.cancel();
            }
            result
        })
    };

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            info!("Shutdown signal received");
            cancel.cancel();
        });
    }

    let driver = CycleDriver::new(
        Arc::new(client),
        metrics,
        health,
        ProbeSettings {
            namespace,
            storage_class: config.storage_class,
            image: config.image,
        },
        config.poll,
        config.check_interval,
    );
    driver.run(cancel.clone()).await;

    cancel.cancel();
    server_task.await.context("Metrics server task panicked")??;

    info!("storage-check stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

//! Process configuration.
//!
//! Resolved once at startup from environment variables; there is no reload.

use std::time::Duration;

use tracing::warn;

use crate::api::ApiServerConfig;
use crate::probe::PollPolicy;

/// Default storage class probed when `STORAGE_CLASS` is unset.
pub const DEFAULT_STORAGE_CLASS: &str = "local-path";

/// Default probe container image when `CHECK_IMAGE` is unset.
pub const DEFAULT_CHECK_IMAGE: &str = "mtr.devops.telekom.de/mcsps/busybox:main";

/// Default seconds between cycles.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Default seconds between pod phase fetches.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Storage probe configuration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Target namespace. `None` falls back to the client's default namespace.
    pub namespace: Option<String>,
    pub storage_class: String,
    pub image: String,
    pub check_interval: Duration,
    pub poll: PollPolicy,
    pub server: ApiServerConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
            image: DEFAULT_CHECK_IMAGE.to_string(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            poll: PollPolicy::default(),
            server: ApiServerConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `NAMESPACE`
    /// - `STORAGE_CLASS` (default "local-path")
    /// - `CHECK_IMAGE`
    /// - `CHECK_INTERVAL` seconds (default 3600)
    /// - `POLL_INTERVAL` seconds (default 2)
    /// - `POLL_TIMEOUT` seconds (default unbounded)
    /// - `METRICS_BIND_ADDRESS`, `METRICS_PORT`
    ///
    /// `LOG_DIR` is read separately by [`crate::logging::log_dir_from_env`]
    /// since logging is installed before this config is parsed.
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self {
            namespace: var("NAMESPACE"),
            ..Self::default()
        };

        if let Some(storage_class) = var("STORAGE_CLASS") {
            config.storage_class = storage_class;
        }

        if let Some(image) = var("CHECK_IMAGE") {
            config.image = image;
        }

        if let Some(raw) = var("CHECK_INTERVAL") {
            match parse_positive_secs(&raw) {
                Some(interval) => config.check_interval = interval,
                None => warn!(value = %raw, "Invalid CHECK_INTERVAL, using default"),
            }
        }

        if let Some(raw) = var("POLL_INTERVAL") {
            match parse_positive_secs(&raw) {
                Some(interval) => config.poll.interval = interval,
                None => warn!(value = %raw, "Invalid POLL_INTERVAL, using default"),
            }
        }

        if let Some(raw) = var("POLL_TIMEOUT") {
            config.poll.timeout = parse_positive_secs(&raw);
            if config.poll.timeout.is_none() {
                warn!(value = %raw, "Invalid POLL_TIMEOUT, polling without a bound");
            }
        }

        if let Some(bind_address) = var("METRICS_BIND_ADDRESS") {
            config.server.bind_address = bind_address;
        }

        if let Some(port) = var("METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) => config.server.port = parsed,
                Err(_) => warn!(value = %port, "Invalid METRICS_PORT, using default"),
            }
        }

        config
    }
}

/// Parse a whole number of seconds; zero, negative and non-numeric values are
/// rejected.
fn parse_positive_secs(raw: &str) -> Option<Duration> {
    match raw.parse::<i64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
        _ => None,
    }
}

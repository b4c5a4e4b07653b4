//! storage-check library crate.
//!
//! Periodically provisions a persistent volume claim and a pod that writes to
//! it, observes the pod's terminal phase and publishes the outcome as metrics.

pub mod api;
pub mod cluster;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod panic_hook;
pub mod probe;

pub use error::{Error, Result};

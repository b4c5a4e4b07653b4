//! Application-wide error types.

use thiserror::Error;

use crate::cluster::ResourceKind;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Created {kind} has no name")]
    MissingName { kind: ResourceKind },

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("API server error: {0}")]
    ApiError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn missing_name(kind: ResourceKind) -> Self {
        Self::MissingName { kind }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

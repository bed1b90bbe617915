//! Error types for asymmetric-balancer
//!
//! Registration failures are `InvalidArgument`, selection failures are
//! `IllegalState`. The remaining variants belong to plan file loading.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum BalancerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read plan file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse plan file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid plan file {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },
}

impl BalancerError {
    pub(crate) fn invalid_argument(msg: &str) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    pub(crate) fn illegal_state(msg: &str) -> Self {
        Self::IllegalState(msg.to_string())
    }

    /// True for errors raised while registering workloads
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// True for errors raised while selecting a workload
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }
}

/// Convenience type alias for Results
pub type BalancerResult<T> = Result<T, BalancerError>;

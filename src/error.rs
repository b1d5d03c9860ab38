//! Error types for the health check service

use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers that misuse the API.
///
/// Probe check failures never show up here; they are absorbed into
/// [`crate::domain::ExecutionResult`] and the category outcome.
#[derive(Error, Debug)]
pub enum Error {
    /// Probe failed validation at build or registration time
    #[error("Invalid probe {field}: {reason}")]
    InvalidProbe { field: &'static str, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prometheus registry or encoding error
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidProbe`].
    pub fn invalid_probe(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidProbe {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure reason produced by a single probe check.
///
/// Cloneable so that one round's results can be handed to both the caller
/// and the metrics sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Check reported a failure
    #[error("{0}")]
    Failed(String),

    /// Execution context was cancelled
    #[error("context cancelled")]
    Cancelled,

    /// Execution context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Check-local timeout elapsed
    #[error("check timed out after {0:?}")]
    Timeout(Duration),

    /// Check panicked
    #[error("check panicked: {0}")]
    Panicked(String),

    /// Check task was aborted before reporting
    #[error("check task aborted")]
    Aborted,

    /// Probe was built without a check function
    #[error("no probe check function")]
    NotConfigured,

    /// TCP connection failed
    #[error("connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    /// DNS resolution failed
    #[error("could not resolve host {host}: {reason}")]
    Resolve { host: String, reason: String },

    /// HTTP endpoint answered with an error status
    #[error("probe check failed: status code: {0}")]
    HttpStatus(u16),

    /// HTTP request failed
    #[error("http request failed: {0}")]
    Http(String),
}

impl CheckError {
    /// Build a [`CheckError::Failed`] from any message.
    pub fn failed(reason: impl Into<String>) -> Self {
        CheckError::Failed(reason.into())
    }

    /// True when the failure came from the execution context rather than the check itself.
    pub fn is_context_error(&self) -> bool {
        matches!(self, CheckError::Cancelled | CheckError::DeadlineExceeded)
    }
}

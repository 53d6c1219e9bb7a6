//! Error types used throughout the client
//!
//! Every failure a caller can observe is one of the variants below. Nothing is
//! logged-and-swallowed: an operation either yields its value or one of these.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for data-access operations
///
/// `Clone` so that a single authentication outcome can be handed to every
/// caller that joined the same in-flight attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    /// Bad credential, or both authentication attempts within one operation
    /// were rejected.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Identity is valid but lacks the privilege for the requested resource.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The remote payload did not match any recognized shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Connectivity failure (refused, reset, transport timeout).
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Any non-auth, non-404 status from the remote service.
    #[error("Remote server error ({status}): {message}")]
    RemoteServer {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body or a short description
        message: String,
    },

    /// Row or table absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller-supplied deadline elapsed before the operation completed.
    #[error("Deadline of {0:?} exceeded")]
    Timeout(Duration),

    /// Caller input rejected before any I/O took place.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client construction or configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for data-access operations
pub type Result<T> = std::result::Result<T, DataAccessError>;

/// Fieldless mirror of [`DataAccessError`] used in events and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Schema,
    TransientNetwork,
    RemoteServer,
    NotFound,
    Timeout,
    InvalidInput,
    Config,
}

impl ErrorKind {
    /// Stable label suitable for log fields and metric tags.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Schema => "schema",
            Self::TransientNetwork => "transient_network",
            Self::RemoteServer => "remote_server",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::InvalidInput => "invalid_input",
            Self::Config => "config",
        }
    }
}

/// Coarse grouping of errors by who has to act on them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Identity or privilege problems (401/403)
    Access,
    /// Payload or input problems; retrying cannot help
    Contract,
    /// Connectivity problems; a later attempt may succeed
    Network,
    /// The remote service reported a failure
    Remote,
    /// Caller deadline or local configuration
    Local,
}

impl DataAccessError {
    /// Fieldless kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Schema(_) => ErrorKind::Schema,
            Self::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Self::RemoteServer { .. } => ErrorKind::RemoteServer,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Get the error category for this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) | Self::Authorization(_) => ErrorCategory::Access,
            Self::Schema(_) | Self::InvalidInput(_) | Self::NotFound(_) => ErrorCategory::Contract,
            Self::TransientNetwork(_) => ErrorCategory::Network,
            Self::RemoteServer { .. } => ErrorCategory::Remote,
            Self::Timeout(_) | Self::Config(_) => ErrorCategory::Local,
        }
    }

    /// Whether a read-only operation may be resubmitted after this error.
    ///
    /// Only connectivity failures qualify. Mutations additionally require an
    /// idempotency key, which is decided by the request executor.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network)
    }
}

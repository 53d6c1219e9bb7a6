//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_READ_RETRIES, DEFAULT_MAX_RETRY_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_USER_AGENT, MAX_READ_RETRIES_CEILING,
};
use crate::errors::{DataAccessError, Result};
use crate::types::{Credential, ProjectScope};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, e.g. `https://tables.example.com/api`
    pub base_url: String,
    /// Project scope embedded in every row/table path
    pub project_id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Per-attempt transport timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Deadline applied when a call does not supply its own
    #[serde(default)]
    pub default_deadline_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Bounded retry for read-only operations after transient network failures
///
/// The delay between attempts is fixed and capped; there is no growth and no
/// unbounded loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_read_retries: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_read_retries: DEFAULT_MAX_READ_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Policy that never resubmits
    #[must_use]
    pub const fn disabled() -> Self {
        Self { max_read_retries: 0, retry_delay_ms: 0, max_retry_delay_ms: 0 }
    }

    /// Delay before the next resubmission
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.min(self.max_retry_delay_ms))
    }

    /// Reject retry bounds above the hard ceiling
    ///
    /// # Errors
    /// Returns `DataAccessError::Config` when `max_read_retries` exceeds
    /// [`MAX_READ_RETRIES_CEILING`].
    pub fn validate(&self) -> Result<()> {
        if self.max_read_retries > MAX_READ_RETRIES_CEILING {
            return Err(DataAccessError::Config(format!(
                "max_read_retries {} exceeds ceiling {}",
                self.max_read_retries, MAX_READ_RETRIES_CEILING
            )));
        }
        Ok(())
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    /// Configuration with defaults for everything but the required fields
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            email: email.into(),
            password: password.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_deadline_secs: None,
            user_agent: default_user_agent(),
            retry: RetryPolicy::default(),
        }
    }

    /// Per-attempt transport timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fallback deadline for calls without one
    #[must_use]
    pub fn default_deadline(&self) -> Option<Duration> {
        self.default_deadline_secs.map(Duration::from_secs)
    }

    /// Credential built from `email`/`password`
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::new(self.email.clone(), self.password.clone())
    }

    /// Validated project scope
    ///
    /// # Errors
    /// Returns `DataAccessError::Config` for an empty project id.
    pub fn project_scope(&self) -> Result<ProjectScope> {
        ProjectScope::new(self.project_id.clone())
            .map_err(|e| DataAccessError::Config(format!("Invalid project id: {e}")))
    }

    /// Check required fields and bounds
    ///
    /// # Errors
    /// Returns `DataAccessError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DataAccessError::Config("base_url must not be empty".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| DataAccessError::Config(format!("Invalid base_url: {e}")))?;
        self.project_scope()?;
        if self.email.trim().is_empty() {
            return Err(DataAccessError::Config("email must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(DataAccessError::Config("request_timeout_secs must be positive".into()));
        }
        if self.default_deadline_secs == Some(0) {
            return Err(DataAccessError::Config("default_deadline_secs must be positive".into()));
        }
        self.retry.validate()
    }
}

//! Client constants
//!
//! Defaults and environment variable names used by configuration loading.

// Defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_READ_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 250;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_USER_AGENT: &str = concat!("rowbridge/", env!("CARGO_PKG_VERSION"));

/// Hard ceiling on read retries; configuration above this is rejected.
pub const MAX_READ_RETRIES_CEILING: u32 = 5;

// Wire
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// Environment variables
pub const ENV_BASE_URL: &str = "ROWBRIDGE_BASE_URL";
pub const ENV_PROJECT_ID: &str = "ROWBRIDGE_PROJECT_ID";
pub const ENV_EMAIL: &str = "ROWBRIDGE_EMAIL";
pub const ENV_PASSWORD: &str = "ROWBRIDGE_PASSWORD";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ROWBRIDGE_REQUEST_TIMEOUT_SECS";
pub const ENV_DEADLINE_SECS: &str = "ROWBRIDGE_DEADLINE_SECS";
pub const ENV_MAX_READ_RETRIES: &str = "ROWBRIDGE_MAX_READ_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "ROWBRIDGE_RETRY_DELAY_MS";

//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ROWBRIDGE_BASE_URL`: Service root (required)
//! - `ROWBRIDGE_PROJECT_ID`: Project scope (required)
//! - `ROWBRIDGE_EMAIL`: Login email (required)
//! - `ROWBRIDGE_PASSWORD`: Login password (required; also fills a file config
//!   that leaves it out)
//! - `ROWBRIDGE_REQUEST_TIMEOUT_SECS`: Per-attempt transport timeout
//! - `ROWBRIDGE_DEADLINE_SECS`: Default per-operation deadline
//! - `ROWBRIDGE_MAX_READ_RETRIES`: Read retries after transport failures
//! - `ROWBRIDGE_RETRY_DELAY_MS`: Fixed delay between read retries
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./rowbridge.json` or `./rowbridge.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rowbridge_domain::constants::{
    ENV_BASE_URL, ENV_DEADLINE_SECS, ENV_EMAIL, ENV_MAX_READ_RETRIES, ENV_PASSWORD,
    ENV_PROJECT_ID, ENV_REQUEST_TIMEOUT_SECS, ENV_RETRY_DELAY_MS,
};
use rowbridge_domain::{ClientConfig, DataAccessError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DataAccessError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration does not validate
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The four connection variables are required; tuning variables fall back to
/// their defaults when unset.
///
/// # Errors
/// Returns `DataAccessError::Config` if required variables are missing,
/// a tuning variable does not parse, or the result does not validate.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(
        env_var(ENV_BASE_URL)?,
        env_var(ENV_PROJECT_ID)?,
        env_var(ENV_EMAIL)?,
        env_var(ENV_PASSWORD)?,
    );

    if let Some(secs) = env_parse(ENV_REQUEST_TIMEOUT_SECS)? {
        config.request_timeout_secs = secs;
    }
    if let Some(secs) = env_parse(ENV_DEADLINE_SECS)? {
        config.default_deadline_secs = Some(secs);
    }
    if let Some(retries) = env_parse(ENV_MAX_READ_RETRIES)? {
        config.retry.max_read_retries = retries;
    }
    if let Some(delay) = env_parse(ENV_RETRY_DELAY_MS)? {
        config.retry.retry_delay_ms = delay;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// A file without `password` takes it from `ROWBRIDGE_PASSWORD`.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `DataAccessError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded configuration does not validate
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DataAccessError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DataAccessError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DataAccessError::Config(format!("Failed to read config file: {e}")))?;

    let mut config = parse_config(&contents, &config_path)?;
    if config.password.is_empty() {
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            config.password = password;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `DataAccessError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DataAccessError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DataAccessError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DataAccessError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./rowbridge.{json,toml}`)
/// 2. Parent directory
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 6] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("rowbridge.json"),
        dir.join("rowbridge.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `DataAccessError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DataAccessError::Config(format!(
            "Missing required environment variable: {key}"
        ))),
    }
}

/// Parse an optional environment variable
///
/// # Returns
/// `None` when unset, the parsed value otherwise.
///
/// # Errors
/// Returns `DataAccessError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| DataAccessError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::FailureMode;

/// Client configuration loaded from environment variables. Every knob has a
/// default; a `.env` file is honored when present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the backend API, without a trailing slash.
    pub api_base: String,
    /// Directory backing the local key/value store.
    pub storage_dir: PathBuf,
    /// Per-candidate request timeout, in seconds. The total latency of one
    /// operation is bounded by this times the candidate count.
    pub request_timeout_secs: u64,
    /// Policy for list/update/delete candidate exhaustion.
    pub failure_mode: FailureMode,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base = std::env::var("PORTAL_API_BASE")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());

        let storage_dir = match std::env::var("PORTAL_STORAGE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_storage_dir(),
        };

        let request_timeout_secs = std::env::var("PORTAL_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("PORTAL_REQUEST_TIMEOUT_SECS must be a number of seconds")?;

        let failure_mode = match std::env::var("PORTAL_FAILURE_MODE") {
            Err(_) => FailureMode::Silent,
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "silent" => FailureMode::Silent,
                "surface" => FailureMode::Surface,
                other => anyhow::bail!(
                    "PORTAL_FAILURE_MODE must be 'silent' or 'surface', got '{other}'"
                ),
            },
        };

        Ok(Config {
            api_base,
            storage_dir,
            request_timeout_secs,
            failure_mode,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("portal"))
        .unwrap_or_else(|| PathBuf::from(".portal"))
}

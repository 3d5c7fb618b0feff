use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::infra::neows::DEFAULT_BASE_URL;

/// Log file used when `LOG_FILE_PATH` is unset.
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/neo_rater.log";

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub port: u16,
    pub bookmarks_path: PathBuf,
    pub log_file_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let load = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let port = load("PORT", "3000");
        let port: u16 = port
            .parse()
            .with_context(|| format!("Invalid PORT value: {port}"))?;

        Ok(Self {
            api_key: lookup("NASA_API_KEY").filter(|k| !k.is_empty()),
            base_url: load("NEOWS_BASE_URL", DEFAULT_BASE_URL),
            port,
            bookmarks_path: PathBuf::from(load("BOOKMARKS_PATH", "data/bookmarks.json")),
            log_file_path: load("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH),
        })
    }
}

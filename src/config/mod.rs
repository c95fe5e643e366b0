// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for receiptwatch
//!
//! Settings come from a key/value file (`KEY=value` per line, `#` comments)
//! or, when the path ends in `.json`, from a JSON document with the same
//! fields in snake_case. They are loaded once at startup and passed around
//! as an explicit [`AppConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{ReceiptError, Result};

pub const KEY_API_KEY: &str = "OPENAI_API_KEY";
pub const KEY_WATCH_FOLDER: &str = "WATCH_FOLDER";
pub const KEY_OUTPUT_FOLDER: &str = "OUTPUT_FOLDER";
pub const KEY_MODEL: &str = "OPENAI_MODEL";
pub const KEY_API_BASE: &str = "OPENAI_API_BASE";
pub const KEY_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";
pub const KEY_SETTLE_DELAY: &str = "SETTLE_DELAY_SECS";
pub const KEY_STABILITY_TIMEOUT: &str = "STABILITY_TIMEOUT_SECS";
pub const KEY_HISTORY_FILE: &str = "HISTORY_FILE";

/// Main application configuration
#[derive(Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Credential for the chat-completion service
    #[serde(default)]
    pub openai_api_key: String,

    /// Directory watched (non-recursively) for new receipts
    pub watch_folder: PathBuf,

    /// Directory CSV files are written to
    pub output_folder: PathBuf,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Upper bound on a single categorization request
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Fixed wait after a file appears, for slow cloud-sync writers
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    /// How long to poll for a stable file size after the settle delay
    #[serde(default = "default_stability_timeout")]
    pub stability_timeout_secs: u64,

    /// JSONL file recording the outcome of every receipt
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

// Default value functions
fn default_model() -> String { "gpt-4o".to_string() }
fn default_api_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_settle_delay() -> u64 { 2 }
fn default_stability_timeout() -> u64 { 10 }
fn default_history_file() -> PathBuf { PathBuf::from("receipt_history.jsonl") }

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("watch_folder", &self.watch_folder)
            .field("output_folder", &self.output_folder)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("settle_delay_secs", &self.settle_delay_secs)
            .field("stability_timeout_secs", &self.stability_timeout_secs)
            .field("history_file", &self.history_file)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from a key/value file, or JSON if the path ends in `.json`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReceiptError::Config(format!(
                "Config file not found at {:?}",
                path
            )));
        }

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config = if is_json {
            let content = std::fs::read_to_string(path)?;
            Self::from_json(&content, env_lookup)?
        } else {
            let mut values = HashMap::new();
            let iter = dotenvy::from_path_iter(path).map_err(|e| {
                ReceiptError::Config(format!("Failed to read {:?}: {}", path, e))
            })?;
            for item in iter {
                let (key, value) = item.map_err(|e| {
                    ReceiptError::Config(format!("Failed to parse {:?}: {}", path, e))
                })?;
                values.insert(key, value);
            }
            Self::from_pairs(&values, env_lookup)?
        };

        tracing::debug!("Loaded configuration from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Build a configuration from parsed key/value pairs
    ///
    /// `env` is consulted for the API key when the file does not carry one.
    pub fn from_pairs<F>(values: &HashMap<String, String>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| ReceiptError::Config(format!("Missing required key {}", key)))
        };
        let number = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                Some(raw) => raw.parse().map_err(|_| {
                    ReceiptError::Config(format!("{} must be a whole number, got {:?}", key, raw))
                }),
                None => Ok(default),
            }
        };

        let openai_api_key = get(KEY_API_KEY)
            .or_else(|| env(KEY_API_KEY).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                ReceiptError::Config(format!("Missing required key {}", KEY_API_KEY))
            })?;

        Ok(Self {
            openai_api_key,
            watch_folder: PathBuf::from(require(KEY_WATCH_FOLDER)?),
            output_folder: PathBuf::from(require(KEY_OUTPUT_FOLDER)?),
            model: get(KEY_MODEL).unwrap_or_else(default_model),
            api_base: get(KEY_API_BASE).unwrap_or_else(default_api_base),
            timeout_secs: number(KEY_TIMEOUT, default_timeout())?,
            settle_delay_secs: number(KEY_SETTLE_DELAY, default_settle_delay())?,
            stability_timeout_secs: number(KEY_STABILITY_TIMEOUT, default_stability_timeout())?,
            history_file: get(KEY_HISTORY_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(default_history_file),
        })
    }

    /// Build a configuration from a JSON document
    pub fn from_json<F>(content: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = serde_json::from_str(content)
            .map_err(|e| ReceiptError::Config(format!("Failed to parse config: {}", e)))?;

        if config.openai_api_key.trim().is_empty() {
            config.openai_api_key = env(KEY_API_KEY)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    ReceiptError::Config(format!("Missing required key {}", KEY_API_KEY))
                })?;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn stability_timeout(&self) -> Duration {
        Duration::from_secs(self.stability_timeout_secs)
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

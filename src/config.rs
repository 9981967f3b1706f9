// Configuration for lrcfetch
//
// All settings have defaults, so a config file only needs the values that
// differ from them. Command line flags are applied on top.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::lrclib::{LRCLIB_ENDPOINT, LRCLIB_TIMEOUT_SECS};
use crate::helpers::lyrics::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::logging::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for a lyrics fetching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// LRCLIB lookup endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout of a single request, including connect and body read
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lookup attempts per file
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Extension of the lyrics file written next to each track
    #[serde(default = "default_sidecar_extension")]
    pub sidecar_extension: String,

    /// Audio file extensions to process, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_endpoint() -> String {
    LRCLIB_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    LRCLIB_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY.as_millis() as u64
}

fn default_sidecar_extension() -> String {
    "lrc".to_string()
}

fn default_extensions() -> Vec<String> {
    ["mp3", "flac", "aac", "ogg", "dsd", "dsf", "mp4"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            sidecar_extension: default_sidecar_extension(),
            extensions: default_extensions(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FetcherConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        debug!("Loaded configuration from {}", path.display());
        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Check a file extension (without the dot, any case) against the configured list
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

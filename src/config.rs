use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the shot-change workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote annotation service settings
    pub detection: DetectionConfig,

    /// Output and storage settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Annotation service endpoint
    pub endpoint: String,

    /// Detection model used when none is given on the command line
    pub default_model: String,

    /// Timeout for individual HTTP requests (seconds)
    pub request_timeout_secs: u64,

    /// Deadline for the whole long-running annotation operation (seconds)
    pub operation_timeout_secs: u64,

    /// Interval between operation polls (seconds)
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for per-URI detection data
    pub data_dir: PathBuf,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://videointelligence.googleapis.com".to_string(),
            default_model: "builtin/stable".to_string(),
            request_timeout_secs: 120,
            operation_timeout_secs: 1800,
            poll_interval_secs: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "shotlist.toml",
            "config/shotlist.toml",
            "~/.config/shotlist/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment variables over defaults
        if let Ok(config) = Self::from_env() {
            return Ok(config);
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(data_dir) = std::env::var("SHOTLIST_DATA_DIR") {
            config.output.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(endpoint) = std::env::var("SHOTLIST_ENDPOINT") {
            config.detection.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("SHOTLIST_MODEL") {
            config.detection.default_model = model;
        }

        if let Ok(timeout) = std::env::var("SHOTLIST_OPERATION_TIMEOUT") {
            config.detection.operation_timeout_secs = timeout.parse().unwrap_or(1800);
        }

        Ok(config)
    }
}

//! Configuration management for the risk engine and session driver

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub detection: DetectionConfig,
    pub logging: LoggingConfig,
}

/// Input file locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV of cardholder profiles
    pub profiles_path: String,
    /// CSV of historical transactions
    pub history_path: String,
    /// CSV of candidate transactions to screen
    pub candidates_path: String,
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Country a transaction counts as domestic in
    #[serde(default = "default_reference_country")]
    pub reference_country: String,
    /// Standard-score magnitude treated as an amount outlier
    #[serde(default = "default_amplitude_z")]
    pub amplitude_z: f64,
}

fn default_reference_country() -> String {
    "India".to_string()
}

fn default_amplitude_z() -> f64 {
    3.0
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            reference_country: default_reference_country(),
            amplitude_z: default_amplitude_z(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                profiles_path: "data/profiles.csv".to_string(),
                history_path: "data/history.csv".to_string(),
                candidates_path: "data/candidates.csv".to_string(),
            },
            detection: DetectionConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

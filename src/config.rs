//! Configuration management for Chatlens
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Later sources win: file, then `CHATLENS_*` variables, then CLI flags.

use crate::error::{ChatlensError, Result};
use crate::metrics::{MetricsBinding, MetricsCalculator, ReportZone};
use crate::storage::{SqliteStorage, HISTORY_DB_ENV};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound for the binding debounce, in milliseconds
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Main configuration structure for Chatlens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Metrics computation settings
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// History storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Terminal output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Metrics computation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Zone for hour/day grouping: `local`, `utc` or a fixed offset like `+02:00`
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Delay before the binding recomputes after a snapshot change
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_timezone() -> String {
    "local".to_string()
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// History storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; the user's data directory when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// Terminal output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Emit ANSI colors
    #[serde(default = "default_color")]
    pub color: bool,

    /// Most recent days listed in the activity table
    #[serde(default = "default_max_days")]
    pub max_days: usize,
}

fn default_color() -> bool {
    true
}

fn default_max_days() -> usize {
    14
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            max_days: default_max_days(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatlensError::Config(format!("Failed to read config file: {}", e)))?;
        Ok(serde_yaml::from_str(&contents).map_err(ChatlensError::Yaml)?)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(timezone) = std::env::var("CHATLENS_TIMEZONE") {
            tracing::debug!(timezone = %timezone, "Env override: CHATLENS_TIMEZONE");
            self.metrics.timezone = timezone;
        }

        if let Ok(debounce) = std::env::var("CHATLENS_DEBOUNCE_MS") {
            match debounce.parse() {
                Ok(v) => self.metrics.debounce_ms = v,
                Err(_) => tracing::warn!("Invalid CHATLENS_DEBOUNCE_MS: {}", debounce),
            }
        }

        if let Ok(path) = std::env::var(HISTORY_DB_ENV) {
            tracing::debug!(path = %path, "Env override: {}", HISTORY_DB_ENV);
            self.storage.path = Some(path);
        }

        if let Ok(color) = std::env::var("CHATLENS_COLOR") {
            match color.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.display.color = true,
                "0" | "false" | "no" => self.display.color = false,
                _ => tracing::warn!("Invalid value for CHATLENS_COLOR: {}", color),
            }
        }

        if let Ok(max_days) = std::env::var("CHATLENS_MAX_DAYS") {
            match max_days.parse() {
                Ok(v) => self.display.max_days = v,
                Err(_) => tracing::warn!("Invalid CHATLENS_MAX_DAYS: {}", max_days),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(path) = &cli.storage_path {
            tracing::info!("Using storage DB override from CLI: {}", path);
            self.storage.path = Some(path.clone());
        }
        if let Some(timezone) = &cli.timezone {
            self.metrics.timezone = timezone.clone();
        }
        if cli.no_color {
            self.display.color = false;
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        self.report_zone()?;

        if self.metrics.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ChatlensError::Config(format!(
                "metrics.debounce_ms must be less than or equal to {}",
                MAX_DEBOUNCE_MS
            ))
            .into());
        }

        if self.display.max_days == 0 {
            return Err(
                ChatlensError::Config("display.max_days must be greater than 0".to_string()).into(),
            );
        }

        if matches!(&self.storage.path, Some(p) if p.trim().is_empty()) {
            return Err(
                ChatlensError::Config("storage.path cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Parsed grouping zone
    pub fn report_zone(&self) -> Result<ReportZone> {
        Ok(self.metrics.timezone.parse::<ReportZone>()?)
    }

    /// Calculator for the configured zone
    pub fn calculator(&self) -> Result<MetricsCalculator> {
        Ok(MetricsCalculator::new(self.report_zone()?))
    }

    /// Recompute-on-change binding using the configured zone and debounce
    pub fn binding(&self) -> Result<MetricsBinding> {
        Ok(MetricsBinding::new(
            self.calculator()?,
            Duration::from_millis(self.metrics.debounce_ms),
        ))
    }

    /// Open the configured history database
    pub fn open_storage(&self) -> Result<SqliteStorage> {
        match &self.storage.path {
            Some(path) => SqliteStorage::new_with_path(path),
            None => SqliteStorage::new(),
        }
    }
}

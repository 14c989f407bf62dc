//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/default.toml. Every section is optional; missing keys take the
//! same defaults as `AnalysisConfig::default()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::strategy::drawdown::BaseMode;
use crate::strategy::holding_period::DEFAULT_ENTRY_LEVEL;
use crate::strategy::params::AnalysisConfig;
use crate::strategy::screener::DEFAULT_SYMBOLS;

/// Environment variable overriding `[data] data_dir`
pub const DATA_DIR_ENV: &str = "ANOMALY_SCOPE_DATA_DIR";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub drawdown: DrawdownSection,
    pub screen: ScreenSection,
    pub holding: HoldingSection,
    pub data: DataSection,
    pub logging: LoggingSection,
}

/// Rolling window, band and z-score settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Rolling window length in trading days
    pub window_length: usize,
    /// Observations required per window (defaults to window_length)
    pub min_periods: Option<usize>,
    pub upper_multiplier: f64,
    pub lower_multiplier: f64,
    /// Level-set z-score threshold
    pub z_threshold: f64,
    /// Alert levels for the latest z-score
    pub z_levels: Vec<f64>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let d = AnalysisConfig::default();
        Self {
            window_length: d.window_length,
            min_periods: None,
            upper_multiplier: d.upper_multiplier,
            lower_multiplier: d.lower_multiplier,
            z_threshold: d.z_threshold,
            z_levels: d.z_levels,
        }
    }
}

/// Forward drawdown table axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawdownSection {
    /// Forward horizons in trading days
    pub horizons: Vec<usize>,
    /// Thresholds as fractions (0.05 = 5%)
    pub thresholds: Vec<f64>,
    pub base_mode: BaseMode,
    /// Weight for base_mode = "low_plus_alpha"
    pub alpha: f64,
}

impl Default for DrawdownSection {
    fn default() -> Self {
        let d = AnalysisConfig::default();
        Self {
            horizons: d.horizons,
            thresholds: d.thresholds,
            base_mode: d.base_mode,
            alpha: d.alpha,
        }
    }
}

/// Multi-symbol z-score screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSection {
    pub symbols: Vec<String>,
    /// Trailing observations per symbol
    pub lookback: usize,
}

impl Default for ScreenSection {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            lookback: 22,
        }
    }
}

/// Entry-level holding period model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingSection {
    pub symbol: String,
    pub entry_level: f64,
}

impl Default for HoldingSection {
    fn default() -> Self {
        Self {
            symbol: "^VIX".to_string(),
            entry_level: DEFAULT_ENTRY_LEVEL,
        }
    }
}

/// Where price histories live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory of <SYMBOL>.csv files (`~` is expanded)
    pub data_dir: String,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl DataSection {
    /// Get data directory with environment variable override
    /// Checks ANOMALY_SCOPE_DATA_DIR env var first, falls back to config value
    pub fn resolved_dir(&self) -> PathBuf {
        let raw = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| self.data_dir.clone());
        PathBuf::from(shellexpand::tilde(&raw).to_string())
    }
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, LoaderError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, built-in defaults otherwise
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, LoaderError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), LoaderError> {
        AnalysisConfig::from(self)
            .validate()
            .map_err(|e| LoaderError::ValidationError(e.to_string()))?;

        if self.screen.lookback < 2 {
            return Err(LoaderError::ValidationError(format!(
                "screen.lookback must be >= 2, got {}",
                self.screen.lookback
            )));
        }

        if self.screen.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(LoaderError::ValidationError(
                "screen.symbols cannot contain empty entries".to_string(),
            ));
        }

        if !(self.holding.entry_level.is_finite() && self.holding.entry_level > 0.0) {
            return Err(LoaderError::ValidationError(format!(
                "holding.entry_level must be > 0, got {}",
                self.holding.entry_level
            )));
        }

        if self.data.data_dir.is_empty() {
            return Err(LoaderError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(LoaderError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

// Conversion from Config to AnalysisConfig
impl From<&Config> for AnalysisConfig {
    fn from(config: &Config) -> Self {
        let a = &config.analysis;
        let d = &config.drawdown;
        AnalysisConfig {
            window_length: a.window_length,
            min_periods: a.min_periods.unwrap_or(a.window_length),
            upper_multiplier: a.upper_multiplier,
            lower_multiplier: a.lower_multiplier,
            z_threshold: a.z_threshold,
            z_levels: a.z_levels.clone(),
            horizons: d.horizons.clone(),
            thresholds: d.thresholds.clone(),
            base_mode: d.base_mode,
            alpha: d.alpha,
        }
    }
}

//! Analysis Parameters
//!
//! Explicit per-invocation configuration for the anomaly engine. Nothing is
//! read from long-lived state: every analysis receives one of these.
//! Defaults mirror the dashboards (22-day bands at 2 sigma, -2.5 z alert).

use serde::{Deserialize, Serialize};

use crate::stats::RollingWindow;
use crate::strategy::drawdown::BaseMode;

/// Main analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rolling window length in trading days
    pub window_length: usize,
    /// Observations required before a window yields a value
    pub min_periods: usize,
    /// Upper band = mean + upper_multiplier * std
    pub upper_multiplier: f64,
    /// Lower band = mean - lower_multiplier * std
    pub lower_multiplier: f64,
    /// Level-set z-score signal fires at z <= z_threshold
    pub z_threshold: f64,
    /// Alert levels for the latest z-score (e.g. -2.5 strong, -3 extreme)
    pub z_levels: Vec<f64>,
    /// Forward horizons in trading days
    pub horizons: Vec<usize>,
    /// Drawdown thresholds as fractions in (0, 1)
    pub thresholds: Vec<f64>,
    /// Reference price for drawdowns
    pub base_mode: BaseMode,
    /// Weight for `BaseMode::LowPlusAlpha`
    pub alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_length: 22,
            min_periods: 22,
            upper_multiplier: 2.0,
            lower_multiplier: 2.0,
            z_threshold: -2.5,
            z_levels: vec![-2.5, -3.0],
            horizons: vec![1, 3, 5, 10, 15, 20, 25, 30],
            thresholds: vec![0.02, 0.03, 0.05, 0.07, 0.10, 0.15, 0.20, 0.25, 0.30],
            base_mode: BaseMode::Midpoint,
            alpha: 0.5,
        }
    }
}

impl AnalysisConfig {
    /// Window length; min_periods follows it (full window)
    pub fn with_window(mut self, length: usize) -> Self {
        self.window_length = length;
        self.min_periods = length;
        self
    }

    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods;
        self
    }

    pub fn with_multipliers(mut self, upper: f64, lower: f64) -> Self {
        self.upper_multiplier = upper;
        self.lower_multiplier = lower;
        self
    }

    pub fn with_z_threshold(mut self, threshold: f64) -> Self {
        self.z_threshold = threshold;
        self
    }

    pub fn with_horizons(mut self, horizons: Vec<usize>) -> Self {
        self.horizons = horizons;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_base_mode(mut self, mode: BaseMode) -> Self {
        self.base_mode = mode;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn window(&self) -> RollingWindow {
        RollingWindow::new(self.window_length).with_min_periods(self.min_periods)
    }

    /// Horizons sorted ascending without duplicates
    pub fn sorted_horizons(&self) -> Vec<usize> {
        let mut h = self.horizons.clone();
        h.sort_unstable();
        h.dedup();
        h
    }

    /// Thresholds sorted ascending without duplicates
    pub fn sorted_thresholds(&self) -> Vec<f64> {
        let mut x = self.thresholds.clone();
        x.sort_by(|a, b| a.total_cmp(b));
        x.dedup();
        x
    }

    /// Validate everything the bands and z-score signals need
    pub fn validate_signals(&self) -> Result<(), ConfigError> {
        self.window().validate()?;
        for m in [self.upper_multiplier, self.lower_multiplier] {
            if !m.is_finite() || m <= 0.0 {
                return Err(ConfigError::InvalidMultiplier(m));
            }
        }
        if !self.z_threshold.is_finite() {
            return Err(ConfigError::InvalidZThreshold(self.z_threshold));
        }
        if let Some(&z) = self.z_levels.iter().find(|z| !z.is_finite()) {
            return Err(ConfigError::InvalidZThreshold(z));
        }
        Ok(())
    }

    /// Validate everything the drawdown estimator needs
    pub fn validate_drawdown(&self) -> Result<(), ConfigError> {
        if self.horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }
        if self.horizons.contains(&0) {
            return Err(ConfigError::InvalidHorizon(0));
        }
        if self.thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }
        if let Some(&x) = self
            .thresholds
            .iter()
            .find(|&&x| !(x > 0.0 && x < 1.0))
        {
            return Err(ConfigError::InvalidThreshold(x));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_signals()?;
        self.validate_drawdown()
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid window length: {0} (minimum 2)")]
    InvalidWindow(usize),
    #[error("Invalid min_periods: {min_periods} (must be 1..={length})")]
    InvalidMinPeriods { min_periods: usize, length: usize },
    #[error("Invalid band multiplier: {0} (must be > 0)")]
    InvalidMultiplier(f64),
    #[error("Invalid z-threshold: {0} (must be finite)")]
    InvalidZThreshold(f64),
    #[error("At least one horizon is required")]
    NoHorizons,
    #[error("Invalid horizon: {0} (must be a positive number of trading days)")]
    InvalidHorizon(usize),
    #[error("At least one threshold is required")]
    NoThresholds,
    #[error("Invalid threshold: {0} (must be 0 < x < 1)")]
    InvalidThreshold(f64),
    #[error("Invalid alpha: {0} (must be 0 <= alpha <= 1)")]
    InvalidAlpha(f64),
    #[error("Invalid lookback: {0} (minimum 2)")]
    InvalidLookback(usize),
    #[error("Invalid entry level: {0} (must be a positive price)")]
    InvalidEntryLevel(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.window_length, 22);
        assert_eq!(config.upper_multiplier, 2.0);
        assert_eq!(config.z_threshold, -2.5);
        assert_eq!(config.base_mode, BaseMode::Midpoint);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::default()
            .with_window(20)
            .with_multipliers(2.5, 1.5)
            .with_z_threshold(-3.0);
        assert_eq!(config.window_length, 20);
        assert_eq!(config.min_periods, 20);
        assert_eq!(config.upper_multiplier, 2.5);
        assert_eq!(config.lower_multiplier, 1.5);
        assert_eq!(config.z_threshold, -3.0);
    }

    #[test]
    fn test_invalid_window() {
        let config = AnalysisConfig::default().with_window(1);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWindow(1))));

        let config = AnalysisConfig::default().with_window(10).with_min_periods(11);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMinPeriods { min_periods: 11, length: 10 })
        ));
    }

    #[test]
    fn test_invalid_multiplier() {
        let config = AnalysisConfig::default().with_multipliers(2.0, 0.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMultiplier(_))));
    }

    #[test]
    fn test_invalid_drawdown_inputs() {
        let config = AnalysisConfig::default().with_horizons(vec![]);
        assert_eq!(config.validate(), Err(ConfigError::NoHorizons));

        let config = AnalysisConfig::default().with_horizons(vec![5, 0]);
        assert_eq!(config.validate(), Err(ConfigError::InvalidHorizon(0)));

        let config = AnalysisConfig::default().with_thresholds(vec![0.1, 1.0]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));

        let config = AnalysisConfig::default().with_alpha(1.5);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAlpha(_))));
    }

    #[test]
    fn test_signal_validation_ignores_drawdown_inputs() {
        let config = AnalysisConfig::default().with_horizons(vec![]);
        assert!(config.validate_signals().is_ok());
    }

    #[test]
    fn test_sorted_axes() {
        let config = AnalysisConfig::default()
            .with_horizons(vec![10, 1, 5, 10])
            .with_thresholds(vec![0.1, 0.02, 0.1]);
        assert_eq!(config.sorted_horizons(), vec![1, 5, 10]);
        assert_eq!(config.sorted_thresholds(), vec![0.02, 0.1]);
    }
}

//! Forward Drawdown Probability Estimator
//!
//! For every start day t with a full forward window, the forward drawdown
//! over horizon h is
//!
//!   min(Low[t+1 ..= t+h]) / base[t] - 1
//!
//! and the table cell (h, x) is the share of valid start days whose drawdown
//! reached -x, as a percentage. A start day is valid for h only when all h
//! future lows exist, so a series of N days yields at most N - h windows.
//! The comparison is a plain `<=` on the computed ratio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{AlignedOhlc, AnalysisError, DrawdownTable};
use crate::strategy::params::{AnalysisConfig, ConfigError};

/// Reference price a drawdown is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseMode {
    /// (High + Low) / 2
    Midpoint,
    /// Close
    Close,
    /// Low + alpha * (High - Low)
    LowPlusAlpha,
}

impl BaseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseMode::Midpoint => "midpoint",
            BaseMode::Close => "close",
            BaseMode::LowPlusAlpha => "low_plus_alpha",
        }
    }
}

impl fmt::Display for BaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "midpoint" | "mid" => Ok(BaseMode::Midpoint),
            "close" => Ok(BaseMode::Close),
            "low_plus_alpha" | "alpha" => Ok(BaseMode::LowPlusAlpha),
            other => Err(format!(
                "unknown base mode '{}' (expected midpoint, close or low_plus_alpha)",
                other
            )),
        }
    }
}

/// Per-day base prices for `mode`
pub fn base_series(ohlc: &AlignedOhlc, mode: BaseMode, alpha: f64) -> Vec<f64> {
    ohlc.bars()
        .iter()
        .map(|b| match mode {
            BaseMode::Midpoint => b.midpoint(),
            BaseMode::Close => b.close,
            BaseMode::LowPlusAlpha => b.low_plus_alpha(alpha),
        })
        .collect()
}

/// Builds `DrawdownTable`s for a fixed set of horizons and thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownEstimator {
    horizons: Vec<usize>,
    thresholds: Vec<f64>,
}

impl DrawdownEstimator {
    /// Axes are sorted ascending and deduplicated
    pub fn new(mut horizons: Vec<usize>, mut thresholds: Vec<f64>) -> Result<Self, ConfigError> {
        horizons.sort_unstable();
        horizons.dedup();
        thresholds.sort_by(|a, b| a.total_cmp(b));
        thresholds.dedup();

        match horizons.first() {
            None => return Err(ConfigError::NoHorizons),
            Some(0) => return Err(ConfigError::InvalidHorizon(0)),
            _ => {}
        }
        if thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }
        if let Some(&x) = thresholds.iter().find(|&&x| !(x > 0.0 && x < 1.0)) {
            return Err(ConfigError::InvalidThreshold(x));
        }

        Ok(Self {
            horizons,
            thresholds,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        Self::new(config.horizons.clone(), config.thresholds.clone())
    }

    pub fn horizons(&self) -> &[usize] {
        &self.horizons
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Probability table from parallel Low and base sequences
    ///
    /// Missing entries (`None`, non-finite, or a non-positive base) invalidate
    /// every window that needs them.
    pub fn estimate(&self, low: &[Option<f64>], base: &[Option<f64>]) -> Result<DrawdownTable, AnalysisError> {
        if low.len() != base.len() {
            return Err(AnalysisError::LengthMismatch {
                left: low.len(),
                right: base.len(),
            });
        }

        let n = low.len();
        let mut cells = Vec::with_capacity(self.horizons.len());
        let mut window_counts = Vec::with_capacity(self.horizons.len());

        for &h in &self.horizons {
            let drawdowns: Vec<f64> = (0..n.saturating_sub(h))
                .filter_map(|t| forward_drawdown(low, base, t, h))
                .collect();
            let count = drawdowns.len();

            let row = self
                .thresholds
                .iter()
                .map(|&x| {
                    if count == 0 {
                        return None;
                    }
                    let hits = drawdowns.iter().filter(|&&d| d <= -x).count();
                    Some(hits as f64 / count as f64 * 100.0)
                })
                .collect();

            if count == 0 {
                tracing::debug!("No valid {}-day windows in {} days of data", h, n);
            }
            cells.push(row);
            window_counts.push(count);
        }

        Ok(DrawdownTable {
            horizons: self.horizons.clone(),
            thresholds: self.thresholds.clone(),
            cells,
            window_counts,
            date_range: None,
        })
    }

    /// Table for an aligned OHLC history with the base derived per `mode`
    pub fn estimate_ohlc(
        &self,
        ohlc: &AlignedOhlc,
        mode: BaseMode,
        alpha: f64,
    ) -> Result<DrawdownTable, AnalysisError> {
        let low: Vec<Option<f64>> = ohlc.lows().into_iter().map(Some).collect();
        let base: Vec<Option<f64>> = base_series(ohlc, mode, alpha).into_iter().map(Some).collect();

        let mut table = self.estimate(&low, &base)?;
        table.date_range = ohlc.date_range();

        tracing::info!(
            "Drawdown table: {} days, {} horizons x {} thresholds, base={}",
            ohlc.len(),
            self.horizons.len(),
            self.thresholds.len(),
            mode
        );
        Ok(table)
    }
}

/// min(low[t+1 ..= t+h]) / base[t] - 1, `None` if any input is missing
fn forward_drawdown(low: &[Option<f64>], base: &[Option<f64>], t: usize, h: usize) -> Option<f64> {
    let b = base.get(t).copied().flatten().filter(|b| b.is_finite() && *b > 0.0)?;
    let window = low.get(t + 1..=t + h)?;
    let mut min_low = f64::INFINITY;
    for l in window {
        let l = l.filter(|l| l.is_finite())?;
        min_low = min_low.min(l);
    }
    Some(min_low / b - 1.0)
}

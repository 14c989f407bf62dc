//! Z-Score Gate
//!
//! Level-set threshold signal over the rolling z-score of a price series.
//!
//! Z-Score Formula: z = (close - rolling_mean) / rolling_std
//!
//! Unlike the Bollinger signals, every day with z <= threshold is reported,
//! including consecutive days of the same excursion. The latest z-score is
//! additionally graded against the configured alert levels.
//!
//! At z_threshold = -2.5 only ~0.6% of normally distributed points qualify.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use crate::domain::{PriceSeries, Signal, SignalKind, TriggerPolicy};
use crate::stats::{RollingStats, RollingWindow};
use crate::strategy::bollinger::level_set;
use crate::strategy::params::AnalysisConfig;

/// Z-score of one day with the window statistics behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResult {
    /// Current z-score value
    pub z_score: f64,
    /// Rolling mean used in calculation
    pub mean: f64,
    /// Rolling sample standard deviation
    pub std_dev: f64,
    /// Close of the day
    pub current_price: f64,
}

impl ZScoreResult {
    /// True at or below a (negative) threshold
    pub fn is_oversold(&self, threshold: f64) -> bool {
        self.z_score <= threshold
    }

    /// True at or above a (positive) threshold
    pub fn is_overbought(&self, threshold: f64) -> bool {
        self.z_score >= threshold
    }

    /// Distance from mean in terms of standard deviations
    pub fn deviation_magnitude(&self) -> f64 {
        self.z_score.abs()
    }

    /// P(Z <= z) under a standard normal
    pub fn lower_tail_probability(&self) -> f64 {
        0.5 * erfc(-self.z_score / std::f64::consts::SQRT_2)
    }
}

/// Severity of the latest z-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZScoreAlert {
    /// At or below the most negative level
    Extreme,
    /// At or below the least negative level
    Strong,
    /// Above every level, or undefined
    None,
}

impl ZScoreAlert {
    pub fn classify(z: Option<f64>, levels: &[f64]) -> Self {
        let Some(z) = z else {
            return ZScoreAlert::None;
        };
        let lowest = levels.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if levels.len() > 1 && z <= lowest {
            ZScoreAlert::Extreme
        } else if !levels.is_empty() && z <= highest {
            ZScoreAlert::Strong
        } else {
            ZScoreAlert::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZScoreAlert::Extreme => "EXTREME",
            ZScoreAlert::Strong => "STRONG",
            ZScoreAlert::None => "none",
        }
    }
}

/// A day that met the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreHit {
    pub index: usize,
    pub day: chrono::NaiveDate,
    pub result: ZScoreResult,
}

/// Output of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreScan {
    pub threshold: f64,
    /// Rolling z-score for every day
    pub stats: RollingStats,
    /// Level-set Enter signal at z <= threshold
    pub signal: Signal,
    pub hits: Vec<ZScoreHit>,
    /// Most recent day, when its z-score is defined
    pub latest: Option<ZScoreResult>,
    pub alert: ZScoreAlert,
}

/// Z-score threshold gate
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreGate {
    window: RollingWindow,
    threshold: f64,
    levels: Vec<f64>,
}

impl ZScoreGate {
    pub fn new(window: RollingWindow, threshold: f64) -> Self {
        Self {
            window,
            threshold,
            levels: vec![threshold],
        }
    }

    /// Alert levels for the latest value
    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = levels;
        self
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.window(), config.z_threshold).with_levels(config.z_levels.clone())
    }

    /// Get the current z-threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Rolling z-scores plus every day at or below the threshold
    pub fn scan(&self, series: &PriceSeries) -> ZScoreScan {
        let stats = RollingStats::compute(series, self.window);
        let results: Vec<Option<ZScoreResult>> = (0..series.len())
            .map(|i| result_at(series, &stats, i))
            .collect();

        let indicator: Vec<Option<bool>> = results
            .iter()
            .map(|r| r.map(|r| r.is_oversold(self.threshold)))
            .collect();

        let mut signal = Signal::new(SignalKind::Enter, TriggerPolicy::LevelSet);
        let mut hits = Vec::new();
        for i in level_set(&indicator) {
            let (Some((day, price)), Some(result)) = (series.get(i), results[i]) else {
                continue;
            };
            signal.push(i, day, price);
            hits.push(ZScoreHit {
                index: i,
                day,
                result,
            });
        }

        let latest = results.last().copied().flatten();
        let alert = ZScoreAlert::classify(latest.map(|r| r.z_score), &self.levels);

        tracing::debug!(
            "z-score scan: {} of {} days at or below {}",
            hits.len(),
            series.len(),
            self.threshold
        );

        ZScoreScan {
            threshold: self.threshold,
            stats,
            signal,
            hits,
            latest,
            alert,
        }
    }
}

fn result_at(series: &PriceSeries, stats: &RollingStats, i: usize) -> Option<ZScoreResult> {
    Some(ZScoreResult {
        z_score: stats.zscore.get(i)?,
        mean: stats.mean.get(i)?,
        std_dev: stats.std_dev.get(i)?,
        current_price: series.get(i)?.1,
    })
}

//! Bollinger Band Signals
//!
//! Band = rolling mean +/- k * rolling sample std, with independent upper and
//! lower multipliers.
//!
//! Signals are edge-triggered: the breach condition is a 0/1 indicator and
//! an event fires only where it steps from 0 to 1. Days where the band is
//! undefined count as 0, so the first defined day fires if it already
//! breaches. The 1 -> 0 step is never reported; the opposite side is its
//! own indicator (`close > upper` for Exit).
//!
//! A window whose std is degenerate at the scale of its mean has no band, so
//! rounding noise on a flat series never fires a signal.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisError, Band, PriceSeries, Signal, SignalKind, SignalReturn, TriggerPolicy};
use crate::stats::{moments, RollingStats, RollingWindow};
use crate::strategy::params::AnalysisConfig;

/// Indices where `indicator` switches on (undefined entries count as off)
pub fn edge_triggered(indicator: &[Option<bool>]) -> Vec<usize> {
    let mut prev = false;
    let mut fired = Vec::new();
    for (i, &cond) in indicator.iter().enumerate() {
        let on = cond.unwrap_or(false);
        if on && !prev {
            fired.push(i);
        }
        prev = on;
    }
    fired
}

/// Every index where `indicator` is on
pub fn level_set(indicator: &[Option<bool>]) -> Vec<usize> {
    indicator
        .iter()
        .enumerate()
        .filter_map(|(i, c)| (*c == Some(true)).then_some(i))
        .collect()
}

/// Band parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub window: RollingWindow,
    pub upper_multiplier: f64,
    pub lower_multiplier: f64,
}

/// Enter/Exit events derived from one band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerSignals {
    /// close < lower, edge-triggered
    pub enter: Signal,
    /// close > upper, edge-triggered
    pub exit: Signal,
    /// Return from each Enter price to the latest close
    pub enter_returns: Vec<SignalReturn>,
}

impl BollingerBands {
    pub fn new(window: RollingWindow, upper_multiplier: f64, lower_multiplier: f64) -> Self {
        Self {
            window,
            upper_multiplier,
            lower_multiplier,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.window(), config.upper_multiplier, config.lower_multiplier)
    }

    /// Rolling band over `series`
    pub fn compute(&self, series: &PriceSeries) -> Band {
        let stats = RollingStats::compute(series, self.window);
        self.band_from_stats(&stats)
    }

    /// Band from already computed rolling mean/std; undefined where the std is degenerate
    pub fn band_from_stats(&self, stats: &RollingStats) -> Band {
        let days = stats.mean.days();
        let (upper, lower): (Vec<_>, Vec<_>) = stats
            .mean
            .values()
            .iter()
            .zip(stats.std_dev.values())
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) if !moments::is_degenerate(*s, *m) => (
                    Some(m + self.upper_multiplier * s),
                    Some(m - self.lower_multiplier * s),
                ),
                _ => (None, None),
            })
            .unzip();

        Band {
            center: stats.mean.clone(),
            upper: crate::domain::StatSeries::aligned(days, upper),
            lower: crate::domain::StatSeries::aligned(days, lower),
            upper_multiplier: self.upper_multiplier,
            lower_multiplier: self.lower_multiplier,
        }
    }

    /// Edge-triggered Enter (below lower) and Exit (above upper) events
    pub fn signals(&self, series: &PriceSeries, band: &Band) -> Result<BollingerSignals, AnalysisError> {
        if band.len() != series.len() {
            return Err(AnalysisError::LengthMismatch {
                left: series.len(),
                right: band.len(),
            });
        }

        let closes = series.values();
        let below: Vec<Option<bool>> = (0..closes.len())
            .map(|i| {
                let lower = band.lower.get(i)?;
                band.upper.get(i)?;
                Some(closes[i] < lower)
            })
            .collect();
        let above: Vec<Option<bool>> = (0..closes.len())
            .map(|i| {
                let upper = band.upper.get(i)?;
                band.lower.get(i)?;
                Some(closes[i] > upper)
            })
            .collect();

        let enter = build_signal(series, SignalKind::Enter, &edge_triggered(&below));
        let exit = build_signal(series, SignalKind::Exit, &edge_triggered(&above));
        let enter_returns = signal_returns(series, &enter);

        tracing::debug!(
            "Bollinger signals: {} enter, {} exit over {} days",
            enter.len(),
            exit.len(),
            series.len()
        );

        Ok(BollingerSignals {
            enter,
            exit,
            enter_returns,
        })
    }

    /// Band and signals in one call
    pub fn analyze(&self, series: &PriceSeries) -> Result<(Band, BollingerSignals), AnalysisError> {
        let band = self.compute(series);
        let signals = self.signals(series, &band)?;
        Ok((band, signals))
    }
}

fn build_signal(series: &PriceSeries, kind: SignalKind, indices: &[usize]) -> Signal {
    let mut signal = Signal::new(kind, TriggerPolicy::EdgeTriggered);
    for &i in indices {
        if let Some((day, price)) = series.get(i) {
            signal.push(i, day, price);
        }
    }
    signal
}

/// Percentage change from each event price to the latest value of `series`
pub fn signal_returns(series: &PriceSeries, signal: &Signal) -> Vec<SignalReturn> {
    let Some((_, latest)) = series.latest() else {
        return Vec::new();
    };
    signal
        .events
        .iter()
        .filter_map(|e| SignalReturn::new(e.day, e.price, latest))
        .collect()
}

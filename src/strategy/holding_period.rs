//! Entry-level holding period model
//!
//! Every day whose High reaches `entry_level` opens a short-volatility style
//! trade at that High. The trade is in profit on the first later day whose
//! Low trades below the entry price; the holding period is the calendar-day
//! distance. Trades still open at the end of the history are closed on the
//! last day and marked unresolved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

use crate::domain::AlignedOhlc;
use crate::strategy::params::ConfigError;

/// Default VIX entry level
pub const DEFAULT_ENTRY_LEVEL: f64 = 21.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingTrade {
    pub entry_day: NaiveDate,
    pub entry_price: f64,
    pub exit_day: NaiveDate,
    /// Calendar days from entry to exit
    pub days_to_profit: i64,
    /// False when no later Low went below the entry price
    pub resolved: bool,
}

/// Distribution of holding periods over all trades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub trades: usize,
    pub resolved: usize,
    pub mean_days: Option<f64>,
    pub median_days: Option<f64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
}

impl HoldingSummary {
    pub fn from_trades(trades: &[HoldingTrade]) -> Self {
        let days: Vec<f64> = trades.iter().map(|t| t.days_to_profit as f64).collect();
        let (mean_days, median_days) = if days.is_empty() {
            (None, None)
        } else {
            (Some(days.iter().mean()), Some(Data::new(days.clone()).median()))
        };

        Self {
            trades: trades.len(),
            resolved: trades.iter().filter(|t| t.resolved).count(),
            mean_days,
            median_days,
            min_days: trades.iter().map(|t| t.days_to_profit).min(),
            max_days: trades.iter().map(|t| t.days_to_profit).max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingReport {
    pub entry_level: f64,
    pub trades: Vec<HoldingTrade>,
    pub summary: HoldingSummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingPeriodModel {
    entry_level: f64,
}

impl HoldingPeriodModel {
    pub fn new(entry_level: f64) -> Result<Self, ConfigError> {
        if !(entry_level.is_finite() && entry_level > 0.0) {
            return Err(ConfigError::InvalidEntryLevel(entry_level));
        }
        Ok(Self { entry_level })
    }

    pub fn entry_level(&self) -> f64 {
        self.entry_level
    }

    /// One trade per day with High >= entry level
    pub fn trades(&self, ohlc: &AlignedOhlc) -> Vec<HoldingTrade> {
        let bars = ohlc.bars();
        let Some(last) = bars.last() else {
            return Vec::new();
        };

        bars.iter()
            .enumerate()
            .filter(|(_, bar)| bar.high >= self.entry_level)
            .map(|(i, bar)| {
                let entry_price = bar.high;
                let exit = bars[i + 1..].iter().find(|later| later.low < entry_price);
                let (exit_day, resolved) = match exit {
                    Some(later) => (later.day, true),
                    None => (last.day, false),
                };
                HoldingTrade {
                    entry_day: bar.day,
                    entry_price,
                    exit_day,
                    days_to_profit: (exit_day - bar.day).num_days(),
                    resolved,
                }
            })
            .collect()
    }

    pub fn analyze(&self, ohlc: &AlignedOhlc) -> HoldingReport {
        let trades = self.trades(ohlc);
        let summary = HoldingSummary::from_trades(&trades);
        tracing::debug!(
            "Holding periods at {}: {} trades, {} resolved",
            self.entry_level,
            summary.trades,
            summary.resolved
        );
        HoldingReport {
            entry_level: self.entry_level,
            trades,
            summary,
        }
    }
}

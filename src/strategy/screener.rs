//! Z-Score Screen
//!
//! Whole-sample anomaly screen across several symbols: each symbol's last
//! `lookback` closes are summarised (mean, sample std, skew, excess kurtosis)
//! and the latest close is scored against them. Rows sort by z-score, most
//! negative first, with undefined z-scores at the end.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisError, PriceSeries};
use crate::stats::{SampleSummary, SkewClass};
use crate::strategy::params::ConfigError;

/// Symbols screened when none are given
pub const DEFAULT_SYMBOLS: [&str; 5] = ["QQQ", "SPY", "XLK", "SOXX", "XLF"];

/// One screened symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRow {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub price: f64,
    pub summary: SampleSummary,
    pub skew_class: Option<SkewClass>,
}

impl ScreenRow {
    pub fn z_score(&self) -> Option<f64> {
        self.summary.z_score
    }
}

/// A symbol left out of the screen and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub lookback: usize,
    pub rows: Vec<ScreenRow>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fixed-lookback screener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZScoreScreener {
    lookback: usize,
}

impl ZScoreScreener {
    pub fn new(lookback: usize) -> Result<Self, ConfigError> {
        if lookback < 2 {
            return Err(ConfigError::InvalidLookback(lookback));
        }
        Ok(Self { lookback })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Summary row for one symbol, `None` for an empty series
    pub fn evaluate(&self, symbol: &str, series: &PriceSeries) -> Option<ScreenRow> {
        let recent = series.tail(self.lookback);
        let (as_of, price) = recent.latest()?;
        let summary = SampleSummary::from_slice(recent.values())?;
        Some(ScreenRow {
            symbol: symbol.to_string(),
            as_of,
            price,
            skew_class: summary.skew_class(),
            summary,
        })
    }

    /// Screen every `(symbol, history)` pair
    ///
    /// A symbol whose history cannot be read (unavailable, missing the price
    /// column, malformed) is recorded as skipped. Only a screen where every
    /// symbol was skipped is an error.
    pub fn screen<I>(&self, inputs: I) -> Result<ScreenReport, AnalysisError>
    where
        I: IntoIterator<Item = (String, Result<PriceSeries, AnalysisError>)>,
    {
        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for (symbol, history) in inputs {
            let series = match history {
                Ok(series) => series,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.evaluate(&symbol, &series) {
                Some(row) => rows.push(row),
                None => skipped.push(SkippedSymbol {
                    symbol,
                    reason: "empty history".to_string(),
                }),
            }
        }

        if rows.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "no symbol had data ({} skipped)",
                skipped.len()
            )));
        }

        rows.sort_by(|a, b| compare_z(a.z_score(), b.z_score()));

        Ok(ScreenReport {
            lookback: self.lookback,
            rows,
            skipped,
        })
    }
}

/// Ascending, undefined last
fn compare_z(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

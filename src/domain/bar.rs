//! Daily OHLC bar

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLC(V) data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub day: NaiveDate,
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl OhlcBar {
    pub fn new(day: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            day,
            open: None,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    /// Validate OHLC data integrity
    pub fn is_valid(&self) -> bool {
        let open_ok = self
            .open
            .map(|o| o.is_finite() && o >= self.low && o <= self.high)
            .unwrap_or(true);

        self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.low <= self.close
            && self.close <= self.high
            && open_ok
    }

    /// (High + Low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) * 0.5
    }

    /// Low + alpha * (High - Low)
    pub fn low_plus_alpha(&self, alpha: f64) -> f64 {
        self.low + alpha * (self.high - self.low)
    }
}

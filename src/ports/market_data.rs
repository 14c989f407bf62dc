//! Price history port
//!
//! The analysis core never fetches data itself. Whatever provides daily
//! history (CSV files on disk, an in-memory fixture, a remote provider)
//! implements `PriceHistoryPort` and hands back an un-normalized `RawFrame`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RawFrame;

/// Price history provider errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no history for the symbol
    #[error("No history for symbol: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Historical data query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub symbol: String,
    /// Inclusive first day, `None` for the full history
    pub start: Option<NaiveDate>,
    /// Inclusive last day, `None` for the latest available
    pub end: Option<NaiveDate>,
}

impl HistoryQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
        }
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// Daily price history port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Fetch daily history for `query.symbol`, restricted to the query's day range
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<RawFrame, MarketDataError>;
}

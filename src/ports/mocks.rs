use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::RawFrame;
use crate::ports::market_data::{HistoryQuery, MarketDataError, PriceHistoryPort};

/// In-memory price history that records every query it serves
#[derive(Debug, Default, Clone)]
pub struct MockPriceHistory {
    calls: Arc<Mutex<Vec<HistoryQuery>>>,
    frames: Arc<Mutex<HashMap<String, RawFrame>>>,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve `frame` for `symbol`
    pub fn with_frame(self, symbol: &str, frame: RawFrame) -> Self {
        if let Ok(mut frames) = self.frames.lock() {
            frames.insert(symbol.to_uppercase(), frame);
        }
        self
    }

    /// Get all recorded queries
    pub fn get_calls(&self) -> Vec<HistoryQuery> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PriceHistoryPort for MockPriceHistory {
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<RawFrame, MarketDataError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.clone());
        }
        let frames = self
            .frames
            .lock()
            .map_err(|_| MarketDataError::Parse("mock store poisoned".to_string()))?;
        frames
            .get(&query.symbol.to_uppercase())
            .map(|f| f.slice_days(query.start, query.end))
            .ok_or_else(|| MarketDataError::NotFound(query.symbol.clone()))
    }
}

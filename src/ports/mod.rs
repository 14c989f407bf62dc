//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, the only outside collaborator of the
//! analysis core is the daily price history provider.

pub mod market_data;
pub mod mocks;

pub use market_data::{HistoryQuery, MarketDataError, PriceHistoryPort};
pub use mocks::MockPriceHistory;

#[cfg(test)]
pub use market_data::MockPriceHistoryPort;

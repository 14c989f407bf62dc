//! Strategy Layer - Signals and probability tables over rolling statistics
//!
//! - Bollinger bands with edge-triggered Enter/Exit events
//! - Level-set z-score threshold signal and latest-value alert
//! - Forward drawdown hit-probability table
//! - Multi-symbol z-score screen, entry-level holding periods and monthly
//!   seasonality
//!
//! Every entry point takes its parameters explicitly, usually through
//! `AnalysisConfig`.

pub mod params;
pub mod bollinger;
pub mod zscore_gate;
pub mod drawdown;
pub mod screener;
pub mod holding_period;
pub mod seasonality;

pub use params::{AnalysisConfig, ConfigError};
pub use bollinger::{edge_triggered, level_set, signal_returns, BollingerBands, BollingerSignals};
pub use zscore_gate::{ZScoreAlert, ZScoreGate, ZScoreHit, ZScoreResult, ZScoreScan};
pub use drawdown::{base_series, BaseMode, DrawdownEstimator};
pub use screener::{ScreenReport, ScreenRow, SkippedSymbol, ZScoreScreener, DEFAULT_SYMBOLS};
pub use holding_period::{HoldingPeriodModel, HoldingReport, HoldingSummary, HoldingTrade, DEFAULT_ENTRY_LEVEL};
pub use seasonality::{seasonality, MonthEnd, MonthStats, MonthlyReturn, SeasonalityReport};

//! Domain Layer - Value types of the anomaly engine
//!
//! Pure, immutable data derived from an input price history. Nothing here
//! talks to the outside world; raw provider data enters through the
//! `normalizer` and leaves as aligned series.
//!
//! - `series`: `PriceSeries` and the "no value"-aware `StatSeries`
//! - `bar`: daily OHLC bar with integrity checks
//! - `band`: Bollinger envelope
//! - `signal`: edge-triggered / level-set signal events
//! - `drawdown`: forward drawdown probability table
//! - `normalizer`: flattening and day-alignment of raw provider frames

pub mod error;
pub mod series;
pub mod bar;
pub mod band;
pub mod signal;
pub mod drawdown;
pub mod normalizer;

pub use error::AnalysisError;
pub use series::{PriceSeries, StatSeries};
pub use bar::OhlcBar;
pub use band::Band;
pub use signal::{Signal, SignalEvent, SignalKind, SignalReturn, TriggerPolicy};
pub use drawdown::DrawdownTable;
pub use normalizer::{AlignedFields, AlignedOhlc, ColumnKey, Field, RawFrame};

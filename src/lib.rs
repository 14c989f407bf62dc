//! Anomaly Scope - Rolling-Statistics Anomaly Engine Library
//!
//! Rolling-window statistics over daily price histories, Bollinger and
//! z-score anomaly signals, and forward drawdown hit probabilities.
//!
//! # Modules
//!
//! - `domain`: Value types (PriceSeries, StatSeries, Band, Signal, DrawdownTable) and the normalizer
//! - `stats`: Moments and rolling-window statistics
//! - `ports`: Trait abstractions (PriceHistoryPort)
//! - `strategy`: Signal generators, drawdown estimator, screen, holding period, seasonality
//! - `adapters`: External implementations (CSV history, CSV export, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Analysis service use cases

pub mod domain;
pub mod stats;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;

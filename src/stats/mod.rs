//! Statistics Layer - Rolling and whole-sample moments
//!
//! - `moments`: mean, sample std, plug-in skewness and excess kurtosis over a slice
//! - `rolling`: the same statistics over trailing windows of a price series

pub mod moments;
pub mod rolling;

pub use moments::{SampleSummary, SkewClass};
pub use rolling::{
    rolling_kurtosis, rolling_mean, rolling_skewness, rolling_std, rolling_zscore, RollingStats,
    RollingWindow,
};

//! Analysis Errors
//!
//! Hard-stop failures of an analysis invocation. Per-point gaps (short
//! windows, zero variance, empty probability rows) are not errors: they
//! surface as `None` entries in `StatSeries` and `DrawdownTable`.

use thiserror::Error;

use crate::ports::MarketDataError;
use crate::strategy::params::ConfigError;

/// Errors that abort a whole analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Nothing usable left after normalization (empty history or empty intersection)
    #[error("No data available: {0}")]
    DataUnavailable(String),

    /// A required field is absent from the raw frame
    #[error("Missing field '{field}' in columns: {available}")]
    MissingField { field: String, available: String },

    /// Input series violates ordering or finiteness
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Parallel inputs have different lengths
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Analysis configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// External price history collaborator failed
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

impl AnalysisError {
    /// True when the caller should render an empty-result state rather than fail loudly
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            AnalysisError::DataUnavailable(_)
                | AnalysisError::MarketData(MarketDataError::NotFound(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_classification() {
        assert!(AnalysisError::DataUnavailable("SPY".into()).is_data_unavailable());
        assert!(AnalysisError::MarketData(MarketDataError::NotFound("XYZ".into()))
            .is_data_unavailable());
        assert!(!AnalysisError::InvalidSeries("dup".into()).is_data_unavailable());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::MissingField {
            field: "Low".to_string(),
            available: "Close, High".to_string(),
        };
        assert!(err.to_string().contains("Low"));
        assert!(err.to_string().contains("Close, High"));
    }
}

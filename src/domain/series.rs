//! Price and statistic series
//!
//! `PriceSeries` holds validated observations indexed by trading day.
//! `StatSeries` is any derived per-day quantity where a day may carry
//! "no value" (`None`) instead of a fabricated number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

/// Ordered (trading_day, price) observations
///
/// Days are strictly increasing and every value is finite. Non-trading days
/// are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    days: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered days, duplicates and non-finite values
    pub fn new(days: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, AnalysisError> {
        if days.len() != values.len() {
            return Err(AnalysisError::LengthMismatch {
                left: days.len(),
                right: values.len(),
            });
        }

        if let Some(w) = days.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AnalysisError::InvalidSeries(format!(
                "trading days must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }

        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-finite value {} on {}",
                v, days[i]
            )));
        }

        Ok(Self { days, values })
    }

    /// Build from (day, value) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let (days, values) = pairs.into_iter().unzip();
        Self::new(days, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Observation at index `i`
    pub fn get(&self, i: usize) -> Option<(NaiveDate, f64)> {
        Some((*self.days.get(i)?, *self.values.get(i)?))
    }

    /// Most recent observation
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.get(self.len().checked_sub(1)?)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.days.iter().copied().zip(self.values.iter().copied())
    }

    /// The trailing `n` observations (the whole series if shorter)
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.len().saturating_sub(n);
        PriceSeries {
            days: self.days[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Values as a `StatSeries` with every day defined
    pub fn to_stat_series(&self) -> StatSeries {
        StatSeries {
            days: self.days.clone(),
            values: self.values.iter().map(|&v| Some(v)).collect(),
        }
    }
}

/// Day-aligned derived values; `None` marks "no value" at that day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSeries {
    days: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl StatSeries {
    /// Build a derived series; any non-finite entry is demoted to `None`
    pub fn new(days: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self, AnalysisError> {
        if days.len() != values.len() {
            return Err(AnalysisError::LengthMismatch {
                left: days.len(),
                right: values.len(),
            });
        }
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Ok(Self { days, values })
    }

    /// Internal constructor for engine outputs already aligned to `days`
    pub(crate) fn aligned(days: &[NaiveDate], values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(days.len(), values.len());
        Self {
            days: days.to_vec(),
            values: values
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value at index `i`, `None` when out of range or undefined
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// Number of days carrying a value
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Last day of the series and its value (which may be undefined)
    pub fn latest(&self) -> Option<(NaiveDate, Option<f64>)> {
        Some((*self.days.last()?, *self.values.last()?))
    }

    /// Only the defined (day, value) pairs
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.days
            .iter()
            .zip(self.values.iter())
            .filter_map(|(d, v)| v.map(|x| (*d, x)))
    }
}

//! Monthly seasonality
//!
//! Month-end closes (last observation of each calendar month) turned into
//! month-over-month percentage returns, then grouped by calendar month.
//! A return is only formed between adjacent calendar months; a month with
//! no observations breaks the chain.

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::{AnalysisError, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthEnd {
    pub year: i32,
    pub month: u32,
    /// Last trading day of the month in the input
    pub day: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    /// Percent change from the previous month-end close
    pub pct_change: f64,
}

/// Aggregate for one calendar month across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub month: u32,
    pub name: String,
    pub count: usize,
    pub positive: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// positive / count as a percentage, `None` without observations
    pub probability_positive: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityReport {
    pub month_ends: Vec<MonthEnd>,
    pub returns: Vec<MonthlyReturn>,
    /// January through December
    pub months: Vec<MonthStats>,
    /// Most recent calendar year with any return
    pub latest_year: Option<i32>,
}

impl SeasonalityReport {
    pub fn latest_year_returns(&self) -> Vec<MonthlyReturn> {
        match self.latest_year {
            Some(year) => self.returns.iter().copied().filter(|r| r.year == year).collect(),
            None => Vec::new(),
        }
    }
}

/// Last close of every calendar month present in `series`
pub fn month_ends(series: &PriceSeries) -> Vec<MonthEnd> {
    let mut ends: Vec<MonthEnd> = Vec::new();
    for (day, close) in series.iter() {
        let entry = MonthEnd {
            year: day.year(),
            month: day.month(),
            day,
            close,
        };
        match ends.last_mut() {
            Some(last) if last.year == entry.year && last.month == entry.month => *last = entry,
            _ => ends.push(entry),
        }
    }
    ends
}

/// Month-over-month percentage returns between adjacent month-ends
pub fn monthly_returns(ends: &[MonthEnd]) -> Vec<MonthlyReturn> {
    ends.windows(2)
        .filter(|w| month_index(&w[1]) - month_index(&w[0]) == 1 && w[0].close > 0.0)
        .map(|w| MonthlyReturn {
            year: w[1].year,
            month: w[1].month,
            pct_change: (w[1].close / w[0].close - 1.0) * 100.0,
        })
        .collect()
}

fn month_index(end: &MonthEnd) -> i64 {
    i64::from(end.year) * 12 + i64::from(end.month)
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| month.to_string())
}

/// Per-calendar-month statistics of `returns`
pub fn month_stats(returns: &[MonthlyReturn]) -> Vec<MonthStats> {
    (1..=12u32)
        .map(|month| {
            let values: Vec<f64> = returns
                .iter()
                .filter(|r| r.month == month)
                .map(|r| r.pct_change)
                .collect();
            let count = values.len();
            let positive = values.iter().filter(|&&v| v > 0.0).count();
            let (mean, min, max, probability_positive) = if count == 0 {
                (None, None, None, None)
            } else {
                (
                    Some(values.iter().mean()),
                    Some(values.iter().copied().fold(f64::INFINITY, f64::min)),
                    Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                    Some(positive as f64 / count as f64 * 100.0),
                )
            };
            MonthStats {
                month,
                name: month_name(month),
                count,
                positive,
                mean,
                min,
                max,
                probability_positive,
            }
        })
        .collect()
}

/// Full seasonality report for a close series
pub fn seasonality(series: &PriceSeries) -> Result<SeasonalityReport, AnalysisError> {
    let month_ends = month_ends(series);
    let returns = monthly_returns(&month_ends);
    if returns.is_empty() {
        return Err(AnalysisError::DataUnavailable(format!(
            "need two consecutive months of closes, got {} month(s)",
            month_ends.len()
        )));
    }
    let months = month_stats(&returns);
    let latest_year = returns.iter().map(|r| r.year).max();

    tracing::debug!("Seasonality over {} monthly returns", returns.len());

    Ok(SeasonalityReport {
        month_ends,
        returns,
        months,
        latest_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> PriceSeries {
        PriceSeries::from_pairs(points.iter().copied()).unwrap()
    }

    #[test]
    fn test_month_ends_take_last_observation() {
        let s = series(&[
            (d(2023, 1, 3), 100.0),
            (d(2023, 1, 31), 110.0),
            (d(2023, 2, 1), 111.0),
            (d(2023, 2, 28), 99.0),
        ]);
        let ends = month_ends(&s);
        assert_eq!(ends.len(), 2);
        assert_eq!(ends[0].close, 110.0);
        assert_eq!(ends[1].day, d(2023, 2, 28));
    }

    #[test]
    fn test_monthly_returns() {
        let s = series(&[
            (d(2023, 11, 30), 100.0),
            (d(2023, 12, 29), 110.0),
            (d(2024, 1, 31), 99.0),
        ]);
        let returns = monthly_returns(&month_ends(&s));
        assert_eq!(returns.len(), 2);
        assert_eq!((returns[0].year, returns[0].month), (2023, 12));
        assert_relative_eq!(returns[0].pct_change, 10.0, epsilon = 1e-9);
        assert_eq!((returns[1].year, returns[1].month), (2024, 1));
        assert_relative_eq!(returns[1].pct_change, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_month_breaks_chain() {
        let s = series(&[
            (d(2023, 1, 31), 100.0),
            (d(2023, 3, 31), 120.0),
            (d(2023, 4, 28), 126.0),
        ]);
        let returns = monthly_returns(&month_ends(&s));
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].month, 4);
    }

    #[test]
    fn test_probability_uses_observed_count() {
        // Three Januaries: +10%, -10%, +5%
        let s = series(&[
            (d(2020, 12, 31), 100.0),
            (d(2021, 1, 29), 110.0),
            (d(2021, 12, 31), 100.0),
            (d(2022, 1, 31), 90.0),
            (d(2022, 12, 30), 100.0),
            (d(2023, 1, 31), 105.0),
        ]);
        let report = seasonality(&s).unwrap();
        let january = &report.months[0];
        assert_eq!(january.name, "January");
        assert_eq!(january.count, 3);
        assert_eq!(january.positive, 2);
        assert_relative_eq!(january.probability_positive.unwrap(), 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(january.mean.unwrap(), 5.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(january.min.unwrap(), -10.0, epsilon = 1e-9);

        // February never observed
        assert_eq!(report.months[1].count, 0);
        assert_eq!(report.months[1].probability_positive, None);

        assert_eq!(report.latest_year, Some(2023));
        assert_eq!(report.latest_year_returns().len(), 1);
    }

    #[test]
    fn test_single_month_is_unavailable() {
        let s = series(&[(d(2024, 5, 1), 1.0), (d(2024, 5, 2), 2.0)]);
        assert!(seasonality(&s).unwrap_err().is_data_unavailable());
    }
}

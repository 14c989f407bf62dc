//! Rolling Statistics Engine
//!
//! Trailing-window statistics over a `PriceSeries`. The window ending at day
//! t covers `min(t + 1, length)` observations and yields a value only when
//! it holds at least `min_periods` of them; otherwise that day is `None`.

use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, StatSeries};
use crate::strategy::params::ConfigError;

use super::moments;

/// Trailing window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow {
    pub length: usize,
    pub min_periods: usize,
}

impl RollingWindow {
    /// Full window required before any value (`min_periods == length`)
    pub fn new(length: usize) -> Self {
        Self {
            length,
            min_periods: length,
        }
    }

    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length < 2 {
            return Err(ConfigError::InvalidWindow(self.length));
        }
        if self.min_periods == 0 || self.min_periods > self.length {
            return Err(ConfigError::InvalidMinPeriods {
                min_periods: self.min_periods,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Observations of the window ending at `t`, if it is populated enough
    pub fn slice<'a>(&self, values: &'a [f64], t: usize) -> Option<&'a [f64]> {
        if t >= values.len() {
            return None;
        }
        let start = (t + 1).saturating_sub(self.length);
        let window = &values[start..=t];
        (window.len() >= self.min_periods).then_some(window)
    }
}

/// Apply `f` to every trailing window of `series`
pub fn rolling_apply<F>(series: &PriceSeries, window: RollingWindow, f: F) -> StatSeries
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let values = series.values();
    let out = (0..values.len())
        .map(|t| window.slice(values, t).and_then(&f))
        .collect();
    StatSeries::aligned(series.days(), out)
}

pub fn rolling_mean(series: &PriceSeries, window: RollingWindow) -> StatSeries {
    rolling_apply(series, window, moments::mean)
}

/// Sample (n - 1) rolling standard deviation
pub fn rolling_std(series: &PriceSeries, window: RollingWindow) -> StatSeries {
    rolling_apply(series, window, moments::sample_std)
}

/// (value - rolling_mean) / rolling_std, undefined where the std is zero or undefined
pub fn rolling_zscore(series: &PriceSeries, window: RollingWindow) -> StatSeries {
    RollingStats::compute(series, window).zscore
}

pub fn rolling_skewness(series: &PriceSeries, window: RollingWindow) -> StatSeries {
    rolling_apply(series, window, moments::skewness)
}

/// Excess kurtosis over each trailing window
pub fn rolling_kurtosis(series: &PriceSeries, window: RollingWindow) -> StatSeries {
    rolling_apply(series, window, moments::excess_kurtosis)
}

/// Mean, std and z-score computed in one pass over the windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub window: RollingWindow,
    pub mean: StatSeries,
    pub std_dev: StatSeries,
    pub zscore: StatSeries,
}

impl RollingStats {
    pub fn compute(series: &PriceSeries, window: RollingWindow) -> Self {
        let values = series.values();
        let n = values.len();
        let mut mean = Vec::with_capacity(n);
        let mut std_dev = Vec::with_capacity(n);
        let mut zscore = Vec::with_capacity(n);
        let mut degenerate = 0usize;

        for t in 0..n {
            let w = window.slice(values, t);
            let m = w.and_then(moments::mean);
            let s = w.and_then(moments::sample_std);
            let z = match (m, s) {
                (Some(m), Some(s)) => {
                    let z = moments::zscore(values[t], m, s);
                    if z.is_none() {
                        degenerate += 1;
                    }
                    z
                }
                _ => None,
            };
            mean.push(m);
            std_dev.push(s);
            zscore.push(z);
        }

        if degenerate > 0 {
            tracing::debug!("z-score undefined on {} day(s) with zero rolling variance", degenerate);
        }

        let days = series.days();
        Self {
            window,
            mean: StatSeries::aligned(days, mean),
            std_dev: StatSeries::aligned(days, std_dev),
            zscore: StatSeries::aligned(days, zscore),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    fn series(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Days::new(i as u64), v)),
        )
        .unwrap()
    }

    #[test]
    fn test_window_validation() {
        assert!(RollingWindow::new(20).validate().is_ok());
        assert!(RollingWindow::new(1).validate().is_err());
        assert!(RollingWindow::new(5).with_min_periods(6).validate().is_err());
        assert!(RollingWindow::new(5).with_min_periods(0).validate().is_err());
        assert!(RollingWindow::new(5).with_min_periods(2).validate().is_ok());
    }

    #[test]
    fn test_rolling_mean_warmup() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let m = rolling_mean(&s, RollingWindow::new(3));
        assert_eq!(m.values(), &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_min_periods_shortens_warmup() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        let m = rolling_mean(&s, RollingWindow::new(3).with_min_periods(1));
        assert_eq!(m.values(), &[Some(1.0), Some(1.5), Some(2.0), Some(3.0)]);

        // A single observation satisfies min_periods but not the std minimum
        let sd = rolling_std(&s, RollingWindow::new(3).with_min_periods(1));
        assert_eq!(sd.get(0), None);
        assert_relative_eq!(sd.get(1).unwrap(), 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_std_is_sample() {
        let s = series(&[2.0, 4.0, 6.0]);
        let sd = rolling_std(&s, RollingWindow::new(3));
        assert_relative_eq!(sd.get(2).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_series() {
        let s = series(&[42.0; 30]);
        let stats = RollingStats::compute(&s, RollingWindow::new(5));
        for t in 4..30 {
            assert_eq!(stats.std_dev.get(t), Some(0.0));
            assert_eq!(stats.zscore.get(t), None);
        }
        assert_eq!(stats.zscore.defined_count(), 0);
        assert_eq!(rolling_skewness(&s, RollingWindow::new(5)).defined_count(), 0);
        assert_eq!(rolling_kurtosis(&s, RollingWindow::new(5)).defined_count(), 0);
    }

    #[test]
    fn test_zscore_includes_current_day() {
        let s = series(&[10.0, 10.0, 10.0, 10.0, 6.0]);
        let z = rolling_zscore(&s, RollingWindow::new(5));
        // mean 9.2, sample variance (4 * 0.64 + 10.24) / 4 = 3.2
        assert_relative_eq!(z.get(4).unwrap(), -3.2 / 3.2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_zero_variance_only_affects_its_own_day() {
        let s = series(&[5.0, 5.0, 5.0, 6.0, 7.0]);
        let z = rolling_zscore(&s, RollingWindow::new(3));
        assert_eq!(z.get(2), None);
        assert!(z.get(3).is_some());
        assert!(z.get(4).is_some());
    }

    #[test]
    fn test_rolling_skew_symmetric_window() {
        let s = series(&[1.0, 2.0, 3.0, 10.0, 11.0, 12.0]);
        let skew = rolling_skewness(&s, RollingWindow::new(3));
        assert_relative_eq!(skew.get(2).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(skew.get(5).unwrap(), 0.0, epsilon = 1e-12);
        assert!(skew.get(3).unwrap() > 0.0);
    }

    #[test]
    fn test_windowed_matches_whole_sample() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let s = series(&values);
        let k = rolling_kurtosis(&s, RollingWindow::new(4));
        assert_eq!(k.get(7), moments::excess_kurtosis(&values[4..8]));
    }
}

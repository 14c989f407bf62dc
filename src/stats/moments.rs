//! Sample moments
//!
//! Whole-sample statistics over a slice. The rolling engine applies the
//! same functions to each trailing window, so both modes share one
//! convention:
//!
//! - standard deviation: sample, denominator n - 1
//! - skewness: plug-in g1 = m3 / m2^(3/2)
//! - kurtosis: plug-in excess g2 = m4 / m2^2 - 3 (normal -> 0)
//!
//! with m_k = sum((x - mean)^k) / n. Every function returns `None` instead
//! of a number when the statistic is undefined.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Relative floor below which a standard deviation counts as zero
pub const DEGENERATE_STD_EPS: f64 = 1e-12;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().mean())
}

/// Sample standard deviation (n - 1), `None` below two observations
pub fn sample_std(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let std = data.iter().std_dev();
    std.is_finite().then_some(std)
}

/// True when `std` is zero for practical purposes at the scale of `mean`
pub fn is_degenerate(std: f64, mean: f64) -> bool {
    !(std > DEGENERATE_STD_EPS * mean.abs().max(1.0))
}

/// (value - mean) / std, `None` when the deviation is degenerate
pub fn zscore(value: f64, mean: f64, std: f64) -> Option<f64> {
    if is_degenerate(std, mean) {
        return None;
    }
    let z = (value - mean) / std;
    z.is_finite().then_some(z)
}

/// Mean and the second to fourth central moments (population, / n)
fn central_moments(data: &[f64]) -> Option<(f64, f64, f64, f64)> {
    let m = mean(data)?;
    let n = data.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m, m2 / n, m3 / n, m4 / n))
}

/// Plug-in skewness; undefined below two observations or at zero variance
pub fn skewness(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let (m, m2, m3, _) = central_moments(data)?;
    if is_degenerate(m2.sqrt(), m) {
        return None;
    }
    Some(m3 / m2.powf(1.5))
}

/// Plug-in excess kurtosis; undefined below two observations or at zero variance
pub fn excess_kurtosis(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let (m, m2, _, m4) = central_moments(data)?;
    if is_degenerate(m2.sqrt(), m) {
        return None;
    }
    Some(m4 / (m2 * m2) - 3.0)
}

/// Skewness buckets used when screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkewClass {
    /// > 1
    HighlyPositive,
    /// (0.5, 1]
    ModeratelyPositive,
    /// [-0.5, 0.5]
    ApproximatelySymmetric,
    /// [-1, -0.5)
    ModeratelyNegative,
    /// < -1
    HighlyNegative,
}

impl SkewClass {
    pub fn classify(skew: f64) -> Self {
        if skew > 1.0 {
            SkewClass::HighlyPositive
        } else if skew > 0.5 {
            SkewClass::ModeratelyPositive
        } else if skew >= -0.5 {
            SkewClass::ApproximatelySymmetric
        } else if skew >= -1.0 {
            SkewClass::ModeratelyNegative
        } else {
            SkewClass::HighlyNegative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkewClass::HighlyPositive => "highly positive",
            SkewClass::ModeratelyPositive => "moderately positive",
            SkewClass::ApproximatelySymmetric => "approximately symmetric",
            SkewClass::ModeratelyNegative => "moderately negative",
            SkewClass::HighlyNegative => "highly negative",
        }
    }
}

/// Whole-sample description of a fixed lookback slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Last observation of the slice
    pub last: f64,
    /// z-score of `last` against the slice mean and sample std
    pub z_score: Option<f64>,
}

impl SampleSummary {
    /// `None` for an empty slice
    pub fn from_slice(data: &[f64]) -> Option<Self> {
        let mean = mean(data)?;
        let last = *data.last()?;
        let std_dev = sample_std(data);
        let z_score = std_dev.and_then(|s| zscore(last, mean, s));
        Some(Self {
            count: data.len(),
            mean,
            std_dev,
            skewness: skewness(data),
            kurtosis: excess_kurtosis(data),
            last,
            z_score,
        })
    }

    pub fn skew_class(&self) -> Option<SkewClass> {
        self.skewness.map(SkewClass::classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use statrs::distribution::Normal;

    #[test]
    fn test_mean_and_std() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data).unwrap(), 5.0, epsilon = 1e-12);
        // sample variance = 32 / 7
        assert_relative_eq!(sample_std(&data).unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_undefined_below_two_observations() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(skewness(&[1.0]), None);
        assert_eq!(excess_kurtosis(&[1.0]), None);
    }

    #[test]
    fn test_constant_sample() {
        let data = [3.3; 10];
        let std = sample_std(&data).unwrap();
        assert!(is_degenerate(std, 3.3));
        assert_eq!(zscore(3.3, 3.3, std), None);
        assert_eq!(skewness(&data), None);
        assert_eq!(excess_kurtosis(&data), None);
    }

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        let data = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0].map(|x| 50.0 + x);
        assert_abs_diff_eq!(skewness(&data).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_moments() {
        // m2 = 1.25, m3 = 0, m4 = 2.5625 for 1..=4
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(excess_kurtosis(&data).unwrap(), 2.5625 / 1.5625 - 3.0, epsilon = 1e-12);

        // Right-skewed sample
        let data = [1.0, 1.0, 1.0, 10.0];
        assert!(skewness(&data).unwrap() > 1.0);
    }

    #[test]
    fn test_normal_sample_has_near_zero_excess_kurtosis() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(100.0, 5.0).unwrap();
        let data: Vec<f64> = (0..200_000).map(|_| normal.sample(&mut rng)).collect();
        assert_abs_diff_eq!(excess_kurtosis(&data).unwrap(), 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(skewness(&data).unwrap(), 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_skew_classes() {
        assert_eq!(SkewClass::classify(1.5), SkewClass::HighlyPositive);
        assert_eq!(SkewClass::classify(1.0), SkewClass::ModeratelyPositive);
        assert_eq!(SkewClass::classify(0.5), SkewClass::ApproximatelySymmetric);
        assert_eq!(SkewClass::classify(-0.5), SkewClass::ApproximatelySymmetric);
        assert_eq!(SkewClass::classify(-0.7), SkewClass::ModeratelyNegative);
        assert_eq!(SkewClass::classify(-1.0), SkewClass::ModeratelyNegative);
        assert_eq!(SkewClass::classify(-1.01), SkewClass::HighlyNegative);
    }

    #[test]
    fn test_sample_summary() {
        let data = [10.0, 10.0, 10.0, 10.0, 6.0];
        let s = SampleSummary::from_slice(&data).unwrap();
        assert_eq!(s.count, 5);
        assert_relative_eq!(s.mean, 9.2, epsilon = 1e-12);
        assert!(s.z_score.unwrap() < -1.5);
        assert_eq!(s.skew_class(), Some(SkewClass::HighlyNegative));
        assert!(SampleSummary::from_slice(&[]).is_none());
    }
}

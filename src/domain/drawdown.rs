//! Forward drawdown hit-probability table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Probability matrix indexed by (horizon, threshold)
///
/// `cells[i][j]` is the percentage (0-100) of valid start days whose forward
/// drawdown over `horizons[i]` days reached `thresholds[j]`. A horizon with
/// no valid windows has every cell `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownTable {
    pub horizons: Vec<usize>,
    pub thresholds: Vec<f64>,
    pub cells: Vec<Vec<Option<f64>>>,
    /// Valid start days per horizon (the denominator)
    pub window_counts: Vec<usize>,
    /// First and last day of the aligned input
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl DrawdownTable {
    /// Cell by horizon/threshold position
    pub fn cell(&self, horizon_idx: usize, threshold_idx: usize) -> Option<f64> {
        self.cells.get(horizon_idx)?.get(threshold_idx).copied().flatten()
    }

    /// Cell by horizon value and threshold value
    pub fn probability(&self, horizon: usize, threshold: f64) -> Option<f64> {
        let i = self.horizons.iter().position(|&h| h == horizon)?;
        let j = self
            .thresholds
            .iter()
            .position(|&x| (x - threshold).abs() < 1e-12)?;
        self.cell(i, j)
    }

    pub fn window_count(&self, horizon: usize) -> Option<usize> {
        let i = self.horizons.iter().position(|&h| h == horizon)?;
        self.window_counts.get(i).copied()
    }

    /// False when the horizon had no valid windows; such rows must not be rendered as 0%
    pub fn is_row_defined(&self, horizon_idx: usize) -> bool {
        self.window_counts.get(horizon_idx).copied().unwrap_or(0) > 0
    }

    pub fn horizon_labels(&self) -> Vec<String> {
        self.horizons.iter().map(|h| format!("{} days", h)).collect()
    }

    pub fn threshold_labels(&self) -> Vec<String> {
        self.thresholds
            .iter()
            .map(|x| format!("{}%", (x * 100.0).round() as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DrawdownTable {
        DrawdownTable {
            horizons: vec![1, 5],
            thresholds: vec![0.02, 0.1],
            cells: vec![vec![Some(30.0), Some(5.0)], vec![None, None]],
            window_counts: vec![100, 0],
            date_range: None,
        }
    }

    #[test]
    fn test_lookup() {
        let t = table();
        assert_eq!(t.probability(1, 0.02), Some(30.0));
        assert_eq!(t.probability(1, 0.1), Some(5.0));
        assert_eq!(t.probability(5, 0.1), None);
        assert_eq!(t.probability(7, 0.1), None);
        assert_eq!(t.window_count(1), Some(100));
    }

    #[test]
    fn test_row_defined() {
        let t = table();
        assert!(t.is_row_defined(0));
        assert!(!t.is_row_defined(1));
        assert!(!t.is_row_defined(9));
    }

    #[test]
    fn test_labels() {
        let t = table();
        assert_eq!(t.horizon_labels(), vec!["1 days", "5 days"]);
        assert_eq!(t.threshold_labels(), vec!["2%", "10%"]);
    }
}

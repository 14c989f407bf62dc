//! Bollinger-style envelope

use serde::{Deserialize, Serialize};

use super::series::StatSeries;

/// Rolling mean with independently scaled upper and lower deviations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Rolling mean
    pub center: StatSeries,
    /// center + k_upper * rolling_std
    pub upper: StatSeries,
    /// center - k_lower * rolling_std
    pub lower: StatSeries,
    pub upper_multiplier: f64,
    pub lower_multiplier: f64,
}

impl Band {
    pub fn len(&self) -> usize {
        self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// True when center, upper and lower are all defined at `i`
    pub fn is_defined_at(&self, i: usize) -> bool {
        self.center.get(i).is_some() && self.upper.get(i).is_some() && self.lower.get(i).is_some()
    }

    /// Index of the first fully defined day
    pub fn first_defined(&self) -> Option<usize> {
        (0..self.len()).find(|&i| self.is_defined_at(i))
    }
}

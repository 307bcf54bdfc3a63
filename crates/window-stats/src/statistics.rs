//! Mean / Standard Deviation

use serde::{Deserialize, Serialize};

/// Location and spread of a set of values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Number of values the statistics were computed from
    pub count: usize,
}

impl WindowStats {
    /// Compute statistics from a slice of values.
    ///
    /// Returns `None` for an empty slice or when any value is not finite.
    /// A single value has a standard deviation of 0.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let std_dev = if values.len() > 1 {
            let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Some(Self {
            mean,
            std_dev,
            count: values.len(),
        })
    }

    /// Standard deviation used as a z-score divisor: exactly 0 becomes 1
    pub fn divisor(&self) -> f64 {
        if self.std_dev == 0.0 {
            1.0
        } else {
            self.std_dev
        }
    }

    /// Deviation of `value` from the mean in standard-deviation units
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.divisor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let stats = WindowStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_sample_std_dev() {
        let stats = WindowStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        // Population std is 2.0; sample std is sqrt(32 / 7)
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_std_treated_as_one() {
        let stats = WindowStats::compute(&[100.0, 100.0, 100.0]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.divisor(), 1.0);
        assert_eq!(stats.z_score(100.0), 0.0);
        assert_eq!(stats.z_score(103.0), 3.0);
    }

    #[test]
    fn test_single_value() {
        let stats = WindowStats::compute(&[42.0]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.z_score(42.0), 0.0);
    }

    #[test]
    fn test_empty_or_nan_values() {
        assert!(WindowStats::compute(&[]).is_none());
        assert!(WindowStats::compute(&[1.0, f64::NAN]).is_none());
    }
}

//! Centered Rolling Window

use crate::statistics::WindowStats;

/// Centered rolling window of odd width.
///
/// The statistic for index `i` covers `[i - half, i + half]`. Indices whose
/// window would run past either end of the series have no statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    size: usize,
}

impl RollingWindow {
    /// Create a rolling window; returns `None` unless `size` is odd and > 0
    pub fn new(size: usize) -> Option<Self> {
        if size > 0 && size % 2 == 1 {
            Some(Self { size })
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Samples on each side of the center
    pub fn half_width(&self) -> usize {
        self.size / 2
    }

    /// Statistics for every index of `values`, `None` where the window is
    /// incomplete
    pub fn apply(&self, values: &[f64]) -> Vec<Option<WindowStats>> {
        let half = self.half_width();
        (0..values.len())
            .map(|i| {
                if i < half || i + half >= values.len() {
                    return None;
                }
                WindowStats::compute(&values[i - half..=i + half])
            })
            .collect()
    }

    /// Rolling z-score of every value, `None` where the window is incomplete
    pub fn z_scores(&self, values: &[f64]) -> Vec<Option<f64>> {
        self.apply(values)
            .into_iter()
            .zip(values)
            .map(|(stats, &value)| stats.map(|s| s.z_score(value)))
            .collect()
    }
}

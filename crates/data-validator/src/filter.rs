//! Z-Score Outlier Rejection

use serde::{Deserialize, Serialize};
use telemetry_frame::Sample;
use tracing::debug;
use window_stats::{RollingWindow, WindowStats};

/// How the reference mean / standard deviation are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMode {
    /// Centered rolling window; rows with an incomplete window are rejected
    #[default]
    Rolling,
    /// One mean / standard deviation over the whole column
    Global,
}

impl std::str::FromStr for OutlierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rolling" => Ok(OutlierMode::Rolling),
            "global" => Ok(OutlierMode::Global),
            other => Err(format!("unknown outlier mode {other:?}")),
        }
    }
}

/// Two-wheel z-score filter
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    z_threshold: f64,
    window: RollingWindow,
    mode: OutlierMode,
}

impl OutlierFilter {
    pub fn new(z_threshold: f64, window: RollingWindow, mode: OutlierMode) -> Self {
        Self {
            z_threshold,
            window,
            mode,
        }
    }

    /// Per-row keep decision. A row is kept only when both wheel speeds have
    /// a defined z-score with magnitude `<= z_threshold`.
    pub fn retain_mask(&self, samples: &[Sample]) -> Vec<bool> {
        let right: Vec<f64> = samples.iter().map(|s| s.right_speed).collect();
        let left: Vec<f64> = samples.iter().map(|s| s.left_speed).collect();

        let (right_z, left_z) = match self.mode {
            OutlierMode::Rolling => (self.window.z_scores(&right), self.window.z_scores(&left)),
            OutlierMode::Global => (global_z_scores(&right), global_z_scores(&left)),
        };

        let within = |z: Option<f64>| z.is_some_and(|z| z.abs() <= self.z_threshold);
        let mask: Vec<bool> = right_z
            .into_iter()
            .zip(left_z)
            .map(|(r, l)| within(r) && within(l))
            .collect();

        debug!(
            "{:?} z-score filter (threshold {}, window {}): {}/{} rows within bounds",
            self.mode,
            self.z_threshold,
            self.window.size(),
            mask.iter().filter(|k| **k).count(),
            mask.len()
        );
        mask
    }
}

fn global_z_scores(values: &[f64]) -> Vec<Option<f64>> {
    match WindowStats::compute(values) {
        Some(stats) => values.iter().map(|&v| Some(stats.z_score(v))).collect(),
        None => vec![None; values.len()],
    }
}

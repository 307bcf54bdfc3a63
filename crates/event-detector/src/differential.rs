//! Differential-Load Detection

use crate::{check_threshold, DetectorError};
use telemetry_frame::{round3, Dataset, DifferentialEvent};
use tracing::debug;

/// Flags rows whose wheel speed gap exceeds a threshold
#[derive(Debug, Clone)]
pub struct DifferentialDetector {
    threshold: f64,
}

impl DifferentialDetector {
    pub fn new(threshold: f64) -> Result<Self, DetectorError> {
        Ok(Self {
            threshold: check_threshold("differential_threshold", threshold)?,
        })
    }

    /// Rows with `|right - left| > threshold`, in input order
    pub fn detect(&self, dataset: &Dataset) -> Vec<DifferentialEvent> {
        let events: Vec<DifferentialEvent> = dataset
            .samples()
            .iter()
            .filter_map(|sample| {
                let difference = round3((sample.right_speed - sample.left_speed).abs());
                (difference > self.threshold).then(|| DifferentialEvent {
                    sample: sample.rounded(),
                    difference,
                })
            })
            .collect();

        debug!(
            "Differential scan (threshold {}): {} of {} rows flagged",
            self.threshold,
            events.len(),
            dataset.len()
        );
        events
    }
}

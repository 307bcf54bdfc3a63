//! Wheel Slip Detection

use crate::{check_threshold, DetectorError};
use telemetry_frame::{round3, Dataset, Sample, SlipEvent, SlipSide};
use tracing::{debug, trace};

/// Flags rows whose speed changed too fast relative to the previous row
#[derive(Debug, Clone)]
pub struct SlipDetector {
    threshold: f64,
    max_time_gap: f64,
}

impl SlipDetector {
    pub fn new(threshold: f64, max_time_gap: f64) -> Result<Self, DetectorError> {
        Ok(Self {
            threshold: check_threshold("slip_threshold", threshold)?,
            max_time_gap: check_threshold("max_time_gap", max_time_gap)?,
        })
    }

    /// Scan consecutive pairs. Row `i` is an event when
    /// `time_gap <= max_time_gap` and either wheel's `|delta| > threshold`.
    /// Row 0 has no predecessor and is never an event.
    pub fn detect(&self, dataset: &Dataset) -> Vec<SlipEvent> {
        let mut samples: Vec<Sample> = dataset.samples().to_vec();
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));

        let events: Vec<SlipEvent> = samples
            .windows(2)
            .filter_map(|pair| self.compare(&pair[0], &pair[1]))
            .collect();

        debug!(
            "Slip scan (threshold {}, max gap {}s): {} of {} rows flagged",
            self.threshold,
            self.max_time_gap,
            events.len(),
            samples.len()
        );
        events
    }

    fn compare(&self, prev: &Sample, curr: &Sample) -> Option<SlipEvent> {
        let time_gap = round3(curr.time - prev.time);
        if time_gap > self.max_time_gap {
            return None;
        }

        let right_delta = round3(curr.right_speed - prev.right_speed);
        let left_delta = round3(curr.left_speed - prev.left_speed);
        let side = SlipSide::from_flags(
            right_delta.abs() > self.threshold,
            left_delta.abs() > self.threshold,
        )?;

        trace!(
            "Slip at t={}: {:?}, right {:+}, left {:+}",
            curr.time,
            side,
            right_delta,
            left_delta
        );
        Some(SlipEvent {
            sample: curr.rounded(),
            time_gap,
            right_delta,
            left_delta,
            side,
        })
    }
}

//! Steering Angle Range Filter

use crate::DetectorError;
use serde::{Deserialize, Serialize};
use telemetry_frame::Dataset;
use tracing::{debug, warn};

/// Inclusive steering angle range (degrees). Unset bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SteeringRange {
    pub min_angle: Option<f64>,
    pub max_angle: Option<f64>,
}

impl SteeringRange {
    /// Whether either bound is set
    pub fn is_bounded(&self) -> bool {
        self.min_angle.is_some() || self.max_angle.is_some()
    }

    /// Whether an angle lies inside the range
    pub fn contains(&self, angle: f64) -> bool {
        self.min_angle.map_or(true, |min| angle >= min)
            && self.max_angle.map_or(true, |max| angle <= max)
    }
}

/// Keeps rows whose steering angle lies within a range
#[derive(Debug, Clone)]
pub struct SteeringFilter {
    column: String,
    range: SteeringRange,
}

impl SteeringFilter {
    /// Create a filter for a named steering column
    pub fn new(column: impl Into<String>, range: SteeringRange) -> Result<Self, DetectorError> {
        if let (Some(min), Some(max)) = (range.min_angle, range.max_angle) {
            if min > max {
                return Err(DetectorError::InvertedRange { min, max });
            }
        }
        Ok(Self {
            column: column.into(),
            range,
        })
    }

    /// Filter a dataset. When the dataset does not carry the named column
    /// it is returned unchanged. Rows without a steering value are dropped.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if dataset.schema().steering.as_deref() != Some(self.column.as_str()) {
            warn!(
                "Steering column {:?} not present; skipping steering filter",
                self.column
            );
            return dataset.clone();
        }

        let filtered = dataset.retain_where(|sample| {
            sample
                .steering_angle
                .is_some_and(|angle| self.range.contains(angle))
        });
        debug!(
            "Steering filter {:?}: kept {} of {} rows",
            self.range,
            filtered.len(),
            dataset.len()
        );
        filtered
    }
}

//! Drivetrain Event Detection
//!
//! Scans cleaned telemetry for two event classes:
//! - Differential load (left/right wheel speed disagreement)
//! - Wheel slip (speed jump between consecutive samples)
//!
//! Also provides the steering-angle range filter applied before detection.

mod differential;
mod slip;
mod steering;

pub use differential::DifferentialDetector;
pub use slip::SlipDetector;
pub use steering::{SteeringFilter, SteeringRange};

use serde::{Deserialize, Serialize};
use telemetry_frame::{Dataset, DifferentialEvent, SlipEvent};
use thiserror::Error;
use tracing::info;

/// Detector error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("{name} must be a non-negative number, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Steering range is inverted: [{min}, {max}]")]
    InvertedRange { min: f64, max: f64 },
}

/// Check a threshold parameter
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<f64, DetectorError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(DetectorError::InvalidThreshold { name, value })
    }
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Wheel speed gap above which a row is a differential-load event (RPM)
    pub differential_threshold: f64,

    /// Per-sample speed change above which a row is a slip event (RPM)
    pub slip_threshold: f64,

    /// Longest gap between samples still compared for slip (seconds)
    pub max_time_gap: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            differential_threshold: 100.0,
            slip_threshold: 200.0,
            max_time_gap: 0.125,
        }
    }
}

/// Events found in one dataset
#[derive(Debug, Clone, Default)]
pub struct DetectedEvents {
    pub differential: Vec<DifferentialEvent>,
    pub slip: Vec<SlipEvent>,
}

/// Runs both detectors over a cleaned dataset
pub struct EventDetector {
    differential: DifferentialDetector,
    slip: SlipDetector,
}

impl EventDetector {
    /// Create both detectors from one config
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        Ok(Self {
            differential: DifferentialDetector::new(config.differential_threshold)?,
            slip: SlipDetector::new(config.slip_threshold, config.max_time_gap)?,
        })
    }

    /// Detect all events
    pub fn detect(&self, dataset: &Dataset) -> DetectedEvents {
        let events = DetectedEvents {
            differential: self.differential.detect(dataset),
            slip: self.slip.detect(dataset),
        };
        info!(
            "Detected {} differential-load and {} slip events in {} samples",
            events.differential.len(),
            events.slip.len(),
            dataset.len()
        );
        events
    }
}

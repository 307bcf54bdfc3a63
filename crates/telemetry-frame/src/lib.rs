//! Drivetrain Telemetry Frames
//!
//! Shared data model for the pipeline crates: samples, datasets and the
//! event records derived from them.

mod dataset;
mod events;

pub use dataset::{Dataset, Schema};
pub use events::{DifferentialEvent, SlipEvent, SlipSide};

use serde::{Deserialize, Serialize};

/// Number of decimal places kept on every numeric field
pub const DECIMALS: i32 = 3;

/// Round a value to [`DECIMALS`] places. Non-finite values pass through.
pub fn round3(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(DECIMALS);
    let rounded = (value * scale).round() / scale;
    // Avoid emitting "-0" for tiny negative values
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// One telemetry row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in seconds
    pub time: f64,
    /// Right rear wheel speed (RPM), NaN when the cell was not numeric
    pub right_speed: f64,
    /// Left rear wheel speed (RPM), NaN when the cell was not numeric
    pub left_speed: f64,
    /// Steering angle (degrees), None when absent or blank
    pub steering_angle: Option<f64>,
}

impl Sample {
    /// Create a sample without a steering angle
    pub fn new(time: f64, right_speed: f64, left_speed: f64) -> Self {
        Self {
            time,
            right_speed,
            left_speed,
            steering_angle: None,
        }
    }

    /// Attach a steering angle
    pub fn with_steering(mut self, angle: f64) -> Self {
        self.steering_angle = Some(angle);
        self
    }

    /// Copy of this sample with every numeric field rounded
    pub fn rounded(&self) -> Self {
        Self {
            time: round3(self.time),
            right_speed: round3(self.right_speed),
            left_speed: round3(self.left_speed),
            steering_angle: self.steering_angle.map(round3),
        }
    }
}

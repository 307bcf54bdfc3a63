//! Wheel Speed Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use telemetry_frame::Sample;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Plausible wheel speed range (RPM), inclusive
    pub speed_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            speed_range: (10.0, 3000.0),
        }
    }
}

/// Physical plausibility gate for wheel speeds
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate one wheel speed: numeric first, then in range
    pub fn validate_speed(&self, field: &'static str, speed: f64) -> Result<(), ValidationError> {
        if !speed.is_finite() {
            return Err(ValidationError::NotNumeric(field));
        }
        self.validate_range(field, speed, self.config.speed_range)
    }

    /// Validate both wheel speeds of a sample.
    ///
    /// A non-numeric speed on either wheel is reported before any range
    /// violation so callers can count the two cases separately.
    pub fn validate_sample(&self, sample: &Sample) -> Result<(), ValidationError> {
        let speeds = [
            ("right_speed", sample.right_speed),
            ("left_speed", sample.left_speed),
        ];
        if let Some(&(field, _)) = speeds.iter().find(|(_, speed)| !speed.is_finite()) {
            return Err(ValidationError::NotNumeric(field));
        }
        for (field, speed) in speeds {
            self.validate_range(field, speed, self.config.speed_range)?;
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_inclusive() {
        let validator = Validator::default();
        assert!(validator.validate_speed("right_speed", 10.0).is_ok());
        assert!(validator.validate_speed("right_speed", 3000.0).is_ok());
        assert!(validator.validate_speed("right_speed", 9.999).is_err());
        assert!(validator.validate_speed("right_speed", 3000.001).is_err());
    }

    #[test]
    fn test_sample_validation() {
        let validator = Validator::default();
        assert!(validator.validate_sample(&Sample::new(0.0, 100.0, 200.0)).is_ok());

        let err = validator
            .validate_sample(&Sample::new(0.0, 100.0, 5000.0))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "left_speed", .. }));
    }

    #[test]
    fn test_non_numeric_reported_first() {
        let validator = Validator::default();
        let err = validator
            .validate_sample(&Sample::new(0.0, 5000.0, f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric("left_speed")));
    }

    #[test]
    fn test_right_wheel_checked_first() {
        let validator = Validator::default();
        let err = validator
            .validate_sample(&Sample::new(0.0, f64::INFINITY, f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric("right_speed")));

        let err = validator
            .validate_sample(&Sample::new(0.0, 1.0, 5000.0))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "right_speed", .. }));
    }

    #[test]
    fn test_custom_range() {
        let validator = Validator::new(ValidationConfig {
            speed_range: (0.0, 50.0),
        });
        assert!(validator.validate_speed("left_speed", 0.0).is_ok());
        assert!(validator.validate_speed("left_speed", 51.0).is_err());
    }
}

//! Validation Error Types

use thiserror::Error;

/// Errors during loading and validation
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Cell could not be coerced to a number
    #[error("{0} is not numeric")]
    NotNumeric(&'static str),

    /// Required column absent from the source table
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Time cell is not a finite number
    #[error("Invalid time value {value:?} at line {line}")]
    InvalidTime { line: u64, value: String },

    /// Stage configured with an unusable parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

//! Derived Event Records

use crate::Sample;
use serde::{Deserialize, Serialize};

/// Sample whose wheel speeds disagree by more than the configured threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialEvent {
    pub sample: Sample,
    /// |right - left|, rounded
    pub difference: f64,
}

/// Which wheel(s) exceeded the slip threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlipSide {
    Right,
    Left,
    Both,
}

impl SlipSide {
    /// Classify from the two per-wheel threshold checks
    pub fn from_flags(right: bool, left: bool) -> Option<Self> {
        match (right, left) {
            (true, true) => Some(SlipSide::Both),
            (true, false) => Some(SlipSide::Right),
            (false, true) => Some(SlipSide::Left),
            (false, false) => None,
        }
    }
}

/// Sample with an abnormal speed change relative to its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipEvent {
    pub sample: Sample,
    /// Seconds since the preceding sample
    pub time_gap: f64,
    pub right_delta: f64,
    pub left_delta: f64,
    pub side: SlipSide,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slip_side_from_flags() {
        assert_eq!(SlipSide::from_flags(true, true), Some(SlipSide::Both));
        assert_eq!(SlipSide::from_flags(true, false), Some(SlipSide::Right));
        assert_eq!(SlipSide::from_flags(false, true), Some(SlipSide::Left));
        assert_eq!(SlipSide::from_flags(false, false), None);
    }
}

//! Run Summary

use crate::params::{ParameterWarning, PipelineParams};
use chrono::{DateTime, Utc};
use data_validator::CleaningReport;
use serde::Serialize;
use telemetry_frame::{SlipEvent, SlipSide};

/// Row counts per stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowCounts {
    pub raw: usize,
    pub binned: usize,
    pub cleaning: CleaningReport,
    /// Rows left after the steering filter, when it ran
    pub steering_filtered: Option<usize>,
    /// Rows handed to the detectors
    pub analyzed: usize,
}

/// Event counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventCounts {
    pub differential: usize,
    pub slip: usize,
    pub slip_right: usize,
    pub slip_left: usize,
    pub slip_both: usize,
}

impl EventCounts {
    pub fn new(differential: usize, slip: &[SlipEvent]) -> Self {
        let count = |side| slip.iter().filter(|e| e.side == side).count();
        Self {
            differential,
            slip: slip.len(),
            slip_right: count(SlipSide::Right),
            slip_left: count(SlipSide::Left),
            slip_both: count(SlipSide::Both),
        }
    }
}

/// Summary of one pipeline run, persisted next to the output tables
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub input: Option<String>,
    pub parameters: PipelineParams,
    pub steering_present: bool,
    pub rows: RowCounts,
    pub events: EventCounts,
    pub warnings: Vec<ParameterWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_frame::Sample;

    fn slip(side: SlipSide) -> SlipEvent {
        SlipEvent {
            sample: Sample::new(0.125, 500.0, 100.0),
            time_gap: 0.125,
            right_delta: 400.0,
            left_delta: 0.0,
            side,
        }
    }

    #[test]
    fn test_event_counts_by_side() {
        let events = vec![slip(SlipSide::Right), slip(SlipSide::Both), slip(SlipSide::Right)];
        let counts = EventCounts::new(4, &events);
        assert_eq!(counts.differential, 4);
        assert_eq!(counts.slip, 3);
        assert_eq!(counts.slip_right, 2);
        assert_eq!(counts.slip_left, 0);
        assert_eq!(counts.slip_both, 1);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = RunSummary {
            generated_at: Utc::now(),
            input: Some("session.csv".to_string()),
            parameters: PipelineParams::default(),
            steering_present: false,
            rows: RowCounts::default(),
            events: EventCounts::default(),
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["input"], "session.csv");
        assert_eq!(json["parameters"]["slip_threshold"], 200.0);
        assert_eq!(json["parameters"]["outlier_mode"], "rolling");
        assert_eq!(json["rows"]["steering_filtered"], serde_json::Value::Null);
    }
}

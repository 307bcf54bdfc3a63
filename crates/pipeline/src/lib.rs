//! Drivetrain Event Pipeline
//!
//! Loads a telemetry table, bins and cleans it, then flags differential-load
//! and wheel-slip events. The finished tables are handed to an
//! [`OutputSink`].

pub mod cli;
pub mod params;
pub mod settings;
pub mod sink;
pub mod summary;

pub use params::{ParameterWarning, PipelineParams, RawParams};
pub use sink::{CsvDirectorySink, OutputSink};
pub use summary::{EventCounts, RowCounts, RunSummary};

use chrono::Utc;
use data_validator::{Cleaner, Normalizer, ValidationError};
use event_detector::{DetectorError, EventDetector, SteeringFilter};
use std::path::Path;
use storage::{RawTable, StorageError, TableReader};
use telemetry_frame::{Dataset, DifferentialEvent, SlipEvent};
use thiserror::Error;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Pipeline errors. All of them abort the run before any output is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// The tables of a run plus its summary
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Sorted, deduplicated input at original granularity
    pub raw: Dataset,
    /// Binned and cleaned samples, before any steering filter
    pub cleaned: Dataset,
    /// Samples the detectors ran on; equals `cleaned` unless the steering
    /// filter ran
    pub analyzed: Dataset,
    pub differential: Vec<DifferentialEvent>,
    pub slip: Vec<SlipEvent>,
    pub summary: RunSummary,
}

/// Configured pipeline; every stage is built up front from one parameter set
pub struct Pipeline {
    params: PipelineParams,
    warnings: Vec<ParameterWarning>,
    normalizer: Normalizer,
    cleaner: Cleaner,
    steering: Option<SteeringFilter>,
    detector: EventDetector,
}

impl Pipeline {
    /// Build all stages
    pub fn new(params: PipelineParams) -> Result<Self, PipelineError> {
        let normalizer = Normalizer::new(params.normalizer_config())?;
        let cleaner = Cleaner::new(params.cleaner_config())?;
        let detector = EventDetector::new(&params.detector_config())?;

        let steering = match (&params.columns.steering, params.steering.is_bounded()) {
            (Some(column), true) => Some(SteeringFilter::new(column.clone(), params.steering)?),
            (None, true) => {
                warn!("Steering range configured without a steering column; ignoring it");
                None
            }
            _ => None,
        };

        Ok(Self {
            params,
            warnings: Vec::new(),
            normalizer,
            cleaner,
            steering,
            detector,
        })
    }

    /// Attach parameter warnings so they end up in the run summary
    pub fn with_warnings(mut self, warnings: Vec<ParameterWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Read and process a delimited file
    pub fn run_path(&self, path: &Path) -> Result<PipelineOutput, PipelineError> {
        let table = TableReader::new(self.params.delimiter).read_path(path)?;
        let mut output = self.run(&table)?;
        output.summary.input = Some(path.display().to_string());
        Ok(output)
    }

    /// Process an already-read table
    pub fn run(&self, table: &RawTable) -> Result<PipelineOutput, PipelineError> {
        let loaded = self.normalizer.normalize(table)?;
        if loaded.raw.is_empty() {
            warn!("Input contains no samples; all outputs will be empty");
        }

        let cleaned = self.cleaner.clean(&loaded.binned);

        let (analyzed, steering_filtered) = match &self.steering {
            Some(filter) if cleaned.dataset.schema().has_steering() => {
                let filtered = filter.apply(&cleaned.dataset);
                let kept = filtered.len();
                (filtered, Some(kept))
            }
            _ => (cleaned.dataset.clone(), None),
        };

        let events = self.detector.detect(&analyzed);

        let summary = RunSummary {
            generated_at: Utc::now(),
            input: None,
            parameters: self.params.clone(),
            steering_present: loaded.raw.schema().has_steering(),
            rows: RowCounts {
                raw: loaded.raw.len(),
                binned: loaded.binned.len(),
                cleaning: cleaned.report,
                steering_filtered,
                analyzed: analyzed.len(),
            },
            events: EventCounts::new(events.differential.len(), &events.slip),
            warnings: self.warnings.clone(),
        };

        info!(
            "Run complete: {} raw, {} binned, {} analyzed rows; {} differential, {} slip events",
            summary.rows.raw,
            summary.rows.binned,
            summary.rows.analyzed,
            summary.events.differential,
            summary.events.slip
        );

        Ok(PipelineOutput {
            raw: loaded.raw,
            cleaned: cleaned.dataset,
            analyzed,
            differential: events.differential,
            slip: events.slip,
            summary,
        })
    }
}

/// Initialize logging to stderr
pub fn init_logging(
    level: Level,
    json: bool,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

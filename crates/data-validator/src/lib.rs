//! Data Validation and Normalization
//!
//! Loads drivetrain telemetry into time-binned datasets and cleans them:
//! non-numeric speeds and implausible values are dropped, then rolling
//! z-score outlier rejection is applied.

mod error;
mod filter;
mod normalizer;
mod validator;

pub use error::ValidationError;
pub use filter::{OutlierFilter, OutlierMode};
pub use normalizer::{bucket_index, NormalizedTelemetry, Normalizer, NormalizerConfig};
pub use validator::{ValidationConfig, Validator};

use serde::{Deserialize, Serialize};
use telemetry_frame::{Dataset, Sample};
use tracing::{debug, info};
use window_stats::RollingWindow;

/// Cleaner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Plausible wheel speed range (RPM), inclusive
    pub speed_range: (f64, f64),
    /// Maximum |z| kept; 0 disables statistical filtering
    pub z_threshold: f64,
    /// Centered rolling window width, odd
    pub rolling_window: usize,
    /// Reference statistics for z-scoring
    pub outlier_mode: OutlierMode,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            speed_range: ValidationConfig::default().speed_range,
            z_threshold: 0.0,
            rolling_window: 15,
            outlier_mode: OutlierMode::Rolling,
        }
    }
}

/// Row accounting for one cleaning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub dropped_non_numeric: usize,
    pub dropped_out_of_range: usize,
    pub dropped_outliers: usize,
    pub rows_kept: usize,
}

/// Cleaned dataset plus its accounting
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub dataset: Dataset,
    pub report: CleaningReport,
}

/// Cleaner for binned telemetry
pub struct Cleaner {
    validator: Validator,
    outliers: Option<OutlierFilter>,
}

impl Cleaner {
    /// Create a cleaner. Fails on a negative threshold, an even or zero
    /// window, or an inverted speed range.
    pub fn new(config: CleanerConfig) -> Result<Self, ValidationError> {
        let (min, max) = config.speed_range;
        if !(min <= max) {
            return Err(ValidationError::InvalidParameter {
                name: "speed_range",
                reason: format!("min {min} exceeds max {max}"),
            });
        }
        if !(config.z_threshold >= 0.0) {
            return Err(ValidationError::InvalidParameter {
                name: "z_threshold",
                reason: format!("must be >= 0, got {}", config.z_threshold),
            });
        }
        let window = RollingWindow::new(config.rolling_window).ok_or_else(|| {
            ValidationError::InvalidParameter {
                name: "rolling_window",
                reason: format!("must be an odd integer >= 1, got {}", config.rolling_window),
            }
        })?;

        let outliers = (config.z_threshold > 0.0)
            .then(|| OutlierFilter::new(config.z_threshold, window, config.outlier_mode));

        Ok(Self {
            validator: Validator::new(ValidationConfig {
                speed_range: config.speed_range,
            }),
            outliers,
        })
    }

    /// Clean a binned dataset. Output rows are a subset of the input in
    /// the same order, rounded to three decimals.
    pub fn clean(&self, dataset: &Dataset) -> CleanedData {
        let mut report = CleaningReport {
            rows_in: dataset.len(),
            ..Default::default()
        };

        let mut gated: Vec<Sample> = Vec::with_capacity(dataset.len());
        for sample in dataset.samples() {
            match self.validator.validate_sample(sample) {
                Ok(()) => gated.push(*sample),
                Err(ValidationError::NotNumeric(_)) => report.dropped_non_numeric += 1,
                Err(e) => {
                    debug!("Dropping sample at t={}: {}", sample.time, e);
                    report.dropped_out_of_range += 1;
                }
            }
        }

        let kept: Vec<Sample> = match &self.outliers {
            Some(filter) => {
                let mask = filter.retain_mask(&gated);
                gated
                    .into_iter()
                    .zip(mask)
                    .filter_map(|(sample, keep)| keep.then_some(sample))
                    .collect()
            }
            None => gated,
        };

        let gated_count = report.rows_in - report.dropped_non_numeric - report.dropped_out_of_range;
        report.dropped_outliers = gated_count - kept.len();
        report.rows_kept = kept.len();

        info!(
            "Cleaned {} rows: {} non-numeric, {} out of range, {} outliers dropped, {} kept",
            report.rows_in,
            report.dropped_non_numeric,
            report.dropped_out_of_range,
            report.dropped_outliers,
            report.rows_kept
        );

        CleanedData {
            dataset: dataset.with_samples(kept.iter().map(Sample::rounded).collect()),
            report,
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self {
            validator: Validator::default(),
            outliers: None,
        }
    }
}

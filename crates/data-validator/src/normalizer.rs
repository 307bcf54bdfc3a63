//! Loading and Time-Binning
//!
//! Binds a raw table to the configured columns, orders it by time, removes
//! duplicate timestamps and averages samples into fixed-width time buckets.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use storage::RawTable;
use telemetry_frame::{Dataset, Sample, Schema};
use tracing::{debug, info, warn};

/// Relative tolerance applied when assigning a time to its bucket
const BUCKET_EPSILON: f64 = 1e-9;

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Requested column bindings. The steering column is optional.
    pub columns: Schema,
    /// Bucket width in seconds
    pub bin_width: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            columns: Schema::default(),
            bin_width: 0.125,
        }
    }
}

/// Both views produced by the loader
#[derive(Debug, Clone)]
pub struct NormalizedTelemetry {
    /// Sorted, deduplicated, then rounded; original granularity
    pub raw: Dataset,
    /// Bucket-averaged; input to every downstream stage
    pub binned: Dataset,
}

/// Loader / normalizer for telemetry tables
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer; the bin width must be a positive number
    pub fn new(config: NormalizerConfig) -> Result<Self, ValidationError> {
        if !(config.bin_width.is_finite() && config.bin_width > 0.0) {
            return Err(ValidationError::InvalidParameter {
                name: "bin_width",
                reason: format!("must be > 0, got {}", config.bin_width),
            });
        }
        Ok(Self { config })
    }

    pub fn bin_width(&self) -> f64 {
        self.config.bin_width
    }

    /// Produce the raw and binned views of a table
    pub fn normalize(&self, table: &RawTable) -> Result<NormalizedTelemetry, ValidationError> {
        let bound = self.bind(table)?;
        let ordered = Self::sort_dedup(&bound);
        let binned = self.bin(&ordered);
        let raw = ordered.with_samples(ordered.samples().iter().map(Sample::rounded).collect());

        info!(
            "Normalized {} rows: {} raw samples, {} bins of {}s",
            table.row_count(),
            raw.len(),
            binned.len(),
            self.config.bin_width
        );

        Ok(NormalizedTelemetry { raw, binned })
    }

    /// Map table columns onto samples in file order.
    ///
    /// Speed cells that are not numeric become NaN; an unusable time cell is
    /// an error.
    pub fn bind(&self, table: &RawTable) -> Result<Dataset, ValidationError> {
        let columns = &self.config.columns;
        let index_of = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| ValidationError::MissingColumn(name.to_string()))
        };
        let time_idx = index_of(columns.time.as_str())?;
        let right_idx = index_of(columns.right_speed.as_str())?;
        let left_idx = index_of(columns.left_speed.as_str())?;

        let steering_idx = match &columns.steering {
            Some(name) => {
                let idx = table.column_index(name);
                if idx.is_none() {
                    warn!("Optional column {:?} not found; steering filtering disabled", name);
                }
                idx
            }
            None => None,
        };

        let schema = Schema {
            steering: steering_idx.and(columns.steering.clone()),
            ..columns.clone()
        };

        let mut samples = Vec::with_capacity(table.row_count());
        for (row_no, row) in table.rows.iter().enumerate() {
            let line = table.lines.get(row_no).copied().unwrap_or(row_no as u64 + 2);
            let time_cell = &row[time_idx];
            let time = parse_number(time_cell)
                .filter(|t| t.is_finite())
                .ok_or_else(|| ValidationError::InvalidTime {
                    line,
                    value: time_cell.clone(),
                })?;

            samples.push(Sample {
                time,
                right_speed: parse_number(&row[right_idx]).unwrap_or(f64::NAN),
                left_speed: parse_number(&row[left_idx]).unwrap_or(f64::NAN),
                steering_angle: steering_idx
                    .and_then(|idx| parse_number(&row[idx]))
                    .filter(|a| a.is_finite()),
            });
        }

        Ok(Dataset::new(schema, samples))
    }

    /// Sort ascending by time and keep the first row of each exact
    /// timestamp (file order breaks ties). Values are left unrounded.
    pub fn sort_dedup(dataset: &Dataset) -> Dataset {
        let mut samples: Vec<Sample> = dataset.samples().to_vec();
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));

        let before = samples.len();
        samples.dedup_by(|later, kept| later.time == kept.time);
        if samples.len() < before {
            debug!("Dropped {} duplicate timestamps", before - samples.len());
        }

        dataset.with_samples(samples)
    }

    /// Average a time-sorted dataset into `[start, start + width)` buckets.
    ///
    /// Each bucket is stamped with its start time.
    pub fn bin(&self, dataset: &Dataset) -> Dataset {
        let width = self.config.bin_width;
        let mut bins: Vec<Sample> = Vec::new();
        let mut current: Option<(i64, BucketAccumulator)> = None;

        for sample in dataset.samples() {
            let key = bucket_index(sample.time, width);
            match current.as_mut() {
                Some((k, acc)) if *k == key => acc.add(sample),
                _ => {
                    if let Some((k, acc)) = current.take() {
                        bins.push(acc.finish(k as f64 * width));
                    }
                    let mut acc = BucketAccumulator::default();
                    acc.add(sample);
                    current = Some((key, acc));
                }
            }
        }
        if let Some((k, acc)) = current {
            bins.push(acc.finish(k as f64 * width));
        }

        dataset.with_samples(bins)
    }
}

/// Bucket index of a time, tolerant of representation error
pub fn bucket_index(time: f64, width: f64) -> i64 {
    let q = time / width;
    (q + BUCKET_EPSILON * q.abs().max(1.0)).floor() as i64
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

/// Running sums for one bucket; non-numeric cells are skipped
#[derive(Default)]
struct BucketAccumulator {
    right: MeanAccumulator,
    left: MeanAccumulator,
    steering: MeanAccumulator,
}

impl BucketAccumulator {
    fn add(&mut self, sample: &Sample) {
        self.right.add(sample.right_speed);
        self.left.add(sample.left_speed);
        if let Some(angle) = sample.steering_angle {
            self.steering.add(angle);
        }
    }

    fn finish(&self, start: f64) -> Sample {
        Sample {
            time: start,
            right_speed: self.right.mean().unwrap_or(f64::NAN),
            left_speed: self.left.mean().unwrap_or(f64::NAN),
            steering_angle: self.steering.mean(),
        }
        .rounded()
    }
}

#[derive(Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

//! Table and Summary Writers

use crate::StorageError;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use telemetry_frame::{round3, DifferentialEvent, Sample, Schema, SlipEvent};
use tracing::debug;

/// A row type that can be written as a table: the sample columns followed
/// by zero or more derived columns
pub trait TableRecord {
    /// Names of the derived columns appended after the schema columns
    fn derived_columns() -> &'static [&'static str];

    /// The underlying sample
    fn sample(&self) -> &Sample;

    /// Values of the derived columns, same order as `derived_columns`
    fn derived_values(&self) -> Vec<f64>;
}

impl TableRecord for Sample {
    fn derived_columns() -> &'static [&'static str] {
        &[]
    }

    fn sample(&self) -> &Sample {
        self
    }

    fn derived_values(&self) -> Vec<f64> {
        Vec::new()
    }
}

impl TableRecord for DifferentialEvent {
    fn derived_columns() -> &'static [&'static str] {
        &["difference"]
    }

    fn sample(&self) -> &Sample {
        &self.sample
    }

    fn derived_values(&self) -> Vec<f64> {
        vec![self.difference]
    }
}

impl TableRecord for SlipEvent {
    fn derived_columns() -> &'static [&'static str] {
        &["timeGap", "rightDelta", "leftDelta"]
    }

    fn sample(&self) -> &Sample {
        &self.sample
    }

    fn derived_values(&self) -> Vec<f64> {
        vec![self.time_gap, self.right_delta, self.left_delta]
    }
}

/// Format a numeric cell: rounded, empty when not a number
fn format_cell(value: f64) -> String {
    if value.is_finite() {
        round3(value).to_string()
    } else {
        String::new()
    }
}

/// Writer for derived telemetry tables
pub struct TableWriter {
    delimiter: u8,
}

impl TableWriter {
    /// Create a writer for the given field delimiter
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Header row for a record type under a schema
    pub fn header<R: TableRecord>(schema: &Schema) -> Vec<String> {
        schema
            .columns()
            .into_iter()
            .chain(R::derived_columns().iter().copied())
            .map(str::to_string)
            .collect()
    }

    /// Write records to any byte sink, returning the number of data rows
    pub fn write<W: Write, R: TableRecord>(
        &self,
        sink: W,
        schema: &Schema,
        records: &[R],
    ) -> Result<usize, StorageError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        writer
            .write_record(Self::header::<R>(schema))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        for record in records {
            let sample = record.sample();
            let mut row = vec![
                format_cell(sample.time),
                format_cell(sample.right_speed),
                format_cell(sample.left_speed),
            ];
            if schema.has_steering() {
                row.push(sample.steering_angle.map(format_cell).unwrap_or_default());
            }
            row.extend(record.derived_values().into_iter().map(format_cell));

            writer
                .write_record(&row)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(records.len())
    }

    /// Write records to a file, creating parent directories as needed
    pub fn write_path<R: TableRecord>(
        &self,
        path: &Path,
        schema: &Schema,
        records: &[R],
    ) -> Result<usize, StorageError> {
        let file = create_file(path)?;
        let written = self.write(file, schema, records)?;
        debug!("Wrote {} rows to {}", written, path.display());
        Ok(written)
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

/// Write a value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let file = create_file(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    debug!("Wrote JSON to {}", path.display());
    Ok(())
}

fn create_file(path: &Path) -> Result<File, StorageError> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    File::create(path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_frame::SlipSide;

    fn schema(steering: bool) -> Schema {
        Schema {
            time: "t".to_string(),
            right_speed: "r".to_string(),
            left_speed: "l".to_string(),
            steering: steering.then(|| "s".to_string()),
        }
    }

    fn render<R: TableRecord>(schema: &Schema, records: &[R]) -> String {
        let mut out = Vec::new();
        TableWriter::default().write(&mut out, schema, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_samples_with_steering() {
        let samples = vec![
            Sample::new(0.0, 100.0, 99.5).with_steering(1.25),
            Sample::new(0.125, f64::NAN, 98.0),
        ];
        let text = render(&schema(true), &samples);
        assert_eq!(text, "t,r,l,s\n0,100,99.5,1.25\n0.125,,98,\n");
    }

    #[test]
    fn test_write_differential_events() {
        let events = vec![DifferentialEvent {
            sample: Sample::new(0.1, 105.0, 240.0),
            difference: 135.0,
        }];
        let text = render(&schema(false), &events);
        assert_eq!(text, "t,r,l,difference\n0.1,105,240,135\n");
    }

    #[test]
    fn test_write_slip_events_rounds_values() {
        let events = vec![SlipEvent {
            sample: Sample::new(0.05, 500.0, 100.0),
            time_gap: 0.0500001,
            right_delta: 400.0,
            left_delta: 0.0,
            side: SlipSide::Right,
        }];
        let text = render(&schema(false), &events);
        assert_eq!(
            text,
            "t,r,l,timeGap,rightDelta,leftDelta\n0.05,500,100,0.05,400,0\n"
        );
    }

    #[test]
    fn test_empty_table_has_header() {
        let text = render::<SlipEvent>(&schema(true), &[]);
        assert_eq!(text, "t,r,l,s,timeGap,rightDelta,leftDelta\n");
    }
}

//! Output Sinks

use crate::{PipelineError, PipelineOutput};
use std::fs;
use std::path::{Path, PathBuf};
use storage::{write_json, StorageError, TableWriter};
use tracing::{info, warn};

pub const CLEANED_FILE: &str = "cleaned.csv";
pub const DIFFERENTIAL_FILE: &str = "differential_events.csv";
pub const SLIP_FILE: &str = "slip_events.csv";
pub const RAW_FILE: &str = "raw.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Receives the finished tables of a run for persistence or presentation
pub trait OutputSink {
    fn publish(&mut self, output: &PipelineOutput) -> Result<(), PipelineError>;
}

/// Writes each table as a delimited file into one directory.
///
/// Files are first written under hidden `.partial` names and renamed only
/// once every table has been written; a failed publish removes the partial
/// files and leaves earlier results in place.
pub struct CsvDirectorySink {
    dir: PathBuf,
    writer: TableWriter,
    write_raw: bool,
    written: Vec<PathBuf>,
}

impl CsvDirectorySink {
    pub fn new(dir: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            dir: dir.into(),
            writer: TableWriter::new(delimiter),
            write_raw: false,
            written: Vec::new(),
        }
    }

    /// Also persist the raw (unbinned) view
    pub fn with_raw(mut self, write_raw: bool) -> Self {
        self.write_raw = write_raw;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written by the last publish
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn stage_all(
        &self,
        output: &PipelineOutput,
        staged: &mut Vec<(PathBuf, PathBuf)>,
    ) -> Result<(), PipelineError> {
        let schema = output.cleaned.schema();

        let (tmp, path) = self.stage_path(CLEANED_FILE);
        staged.push((tmp.clone(), path));
        self.writer.write_path(&tmp, schema, output.cleaned.samples())?;

        let (tmp, path) = self.stage_path(DIFFERENTIAL_FILE);
        staged.push((tmp.clone(), path));
        self.writer.write_path(&tmp, schema, &output.differential)?;

        let (tmp, path) = self.stage_path(SLIP_FILE);
        staged.push((tmp.clone(), path));
        self.writer.write_path(&tmp, schema, &output.slip)?;

        if self.write_raw {
            let (tmp, path) = self.stage_path(RAW_FILE);
            staged.push((tmp.clone(), path));
            self.writer
                .write_path(&tmp, output.raw.schema(), output.raw.samples())?;
        }

        let (tmp, path) = self.stage_path(SUMMARY_FILE);
        staged.push((tmp.clone(), path));
        write_json(&tmp, &output.summary)?;
        Ok(())
    }

    /// Temporary and final path of one output file
    fn stage_path(&self, name: &str) -> (PathBuf, PathBuf) {
        (
            self.dir.join(format!(".{name}.partial")),
            self.dir.join(name),
        )
    }
}

impl OutputSink for CsvDirectorySink {
    fn publish(&mut self, output: &PipelineOutput) -> Result<(), PipelineError> {
        self.written.clear();

        let mut staged = Vec::new();
        if let Err(e) = self.stage_all(output, &mut staged) {
            warn!("Publishing to {} failed; discarding partial files", self.dir.display());
            for (tmp, _) in &staged {
                fs::remove_file(tmp).ok();
            }
            return Err(e);
        }

        for (tmp, path) in staged {
            fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            self.written.push(path);
        }

        info!(
            "Wrote {} files to {}",
            self.written.len(),
            self.dir.display()
        );
        Ok(())
    }
}

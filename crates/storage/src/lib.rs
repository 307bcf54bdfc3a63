//! Storage Layer
//!
//! Reads telemetry tables from delimited text and writes derived tables
//! and run summaries back out.

mod table;
mod writer;

pub use table::{RawTable, TableReader};
pub use writer::{write_json, TableRecord, TableWriter};

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Input file cannot be located
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Malformed tabular content
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Filesystem failure while reading or writing
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        StorageError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

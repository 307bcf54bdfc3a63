//! Delimited Text Table Reader

use crate::StorageError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info};

/// Untyped table as read from the source: one header row and string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names in file order
    pub headers: Vec<String>,
    /// Data rows, each with exactly `headers.len()` cells
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row (for error reporting)
    pub lines: Vec<u64>,
}

impl RawTable {
    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reader for delimited telemetry tables
pub struct TableReader {
    delimiter: u8,
}

impl TableReader {
    /// Create a reader for the given field delimiter
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read a table from a file path
    pub fn read_path(&self, path: &Path) -> Result<RawTable, StorageError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::SourceNotFound(path.to_path_buf()),
            _ => StorageError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let table = self.read(file)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Read a table from any byte source
    pub fn read<R: Read>(&self, source: R) -> Result<RawTable, StorageError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        debug!("Table headers: {:?}", headers);

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push(record.iter().map(str::to_string).collect());
            lines.push(line);
        }

        Ok(RawTable {
            headers,
            rows,
            lines,
        })
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table() {
        let data = "Time (s),Right,Left\n0.0,100,101\n0.1, 102 ,103\n";
        let table = TableReader::default().read(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Time (s)", "Right", "Left"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1][1], "102");
        assert_eq!(table.lines, vec![2, 3]);
        assert_eq!(table.column_index("Left"), Some(2));
        assert_eq!(table.column_index("Steering"), None);
    }

    #[test]
    fn test_header_only_is_empty() {
        let table = TableReader::default().read("t,r,l\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 3);
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let data = "t,r,l\n0.0,1,2\n0.1,3\n";
        let err = TableReader::default().read(data.as_bytes()).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "t;r;l\n0.0;1;2\n";
        let table = TableReader::new(b';').read(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["0.0", "1", "2"]);
    }

    #[test]
    fn test_missing_file() {
        let err = TableReader::default()
            .read_path(Path::new("/definitely/not/here/telemetry.csv"))
            .unwrap_err();
        assert!(matches!(err, StorageError::SourceNotFound(_)));
    }
}

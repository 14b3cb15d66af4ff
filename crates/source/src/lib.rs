//! Record sources for the certificate pipeline.
//!
//! This module provides the `RecordSource` trait and the implementations
//! that feed participant records into certificate generation.
//!
//! ## Available Sources
//!
//! - `CsvRecordSource`: Participant list loaded from a CSV file
//! - `VecRecordSource`: In-memory vector of records
//!
//! ## Example
//!
//! ```ignore
//! use certmill_source::{CsvRecordSource, RecordSource};
//!
//! let mut source = CsvRecordSource::from_path(Path::new("participants.csv"))?;
//! while let Some(record) = source.next() {
//!     println!("Processing: {:?}", record.field("nome"));
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors loading a participant list. Any of these aborts the batch; there
/// is nothing to iterate without a readable source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("participant list not found: {path}")]
    NotFound { path: PathBuf },

    #[error("could not read participant list '{path}': {source}")]
    Unreadable { path: PathBuf, source: csv::Error },

    #[error("participant list '{path}' is not valid CSV: {source}")]
    Malformed { path: PathBuf, source: csv::Error },

    #[error("participant list '{path}' has no header row")]
    Empty { path: PathBuf },
}

impl SourceError {
    fn from_csv(path: &Path, err: csv::Error) -> Self {
        let not_found = matches!(
            err.kind(),
            csv::ErrorKind::Io(e) if e.kind() == io::ErrorKind::NotFound
        );
        if not_found {
            return SourceError::NotFound {
                path: path.to_path_buf(),
            };
        }
        if matches!(err.kind(), csv::ErrorKind::Io(_)) {
            SourceError::Unreadable {
                path: path.to_path_buf(),
                source: err,
            }
        } else {
            SourceError::Malformed {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// One participant row: the header-to-value pairs of a single CSV record.
///
/// Values are kept exactly as read. Interpretation (trimming, deciding that
/// an empty value means the field is missing) belongs to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    row: usize,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(row: usize, fields: Vec<(String, String)>) -> Self {
        Self { row, fields }
    }

    /// 1-based position among the data rows, for log messages.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Looks up a field by exact header name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A trait for sources that feed participant records into the pipeline.
///
/// The abstraction keeps generation independent of where records come from:
/// CSV files today, but equally in-memory collections for tests or other
/// tabular formats later.
pub trait RecordSource: Send {
    /// Get the next record, if available.
    ///
    /// Returns `None` when the source is exhausted.
    fn next(&mut self) -> Option<Record>;

    /// Hint about the total number of records (for progress reporting).
    ///
    /// Returns `None` if the size is unknown or unbounded.
    fn size_hint(&self) -> Option<usize> {
        None
    }

    /// Check if the source has a known size.
    fn has_known_size(&self) -> bool {
        self.size_hint().is_some()
    }
}

/// A record source backed by an in-memory vector.
///
/// This is the simplest source, useful for small datasets or testing.
pub struct VecRecordSource {
    data: Vec<Record>,
    index: usize,
}

impl VecRecordSource {
    pub fn new(data: Vec<Record>) -> Self {
        Self { data, index: 0 }
    }

    /// Get the total number of records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of records remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }
}

impl RecordSource for VecRecordSource {
    fn next(&mut self) -> Option<Record> {
        if self.index < self.data.len() {
            let item = self.data[self.index].clone();
            self.index += 1;
            Some(item)
        } else {
            None
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.data.len())
    }
}

/// A participant list read from a CSV file.
///
/// The whole file is loaded up front so the batch size is known before the
/// first certificate is generated. Short rows are accepted; the fields they
/// lack simply stay absent from the record, and the decision of what a
/// missing field means is left to the consumer. A file without even a
/// header row is rejected as [`SourceError::Empty`].
pub struct CsvRecordSource {
    data: Vec<Record>,
    index: usize,
}

impl CsvRecordSource {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| SourceError::from_csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| SourceError::from_csv(path, e))?
            .clone();
        if headers.is_empty() {
            return Err(SourceError::Empty {
                path: path.to_path_buf(),
            });
        }

        let mut data = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = result.map_err(|e| SourceError::from_csv(path, e))?;
            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            data.push(Record::new(index + 1, fields));
        }
        Ok(Self { data, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl RecordSource for CsvRecordSource {
    fn next(&mut self) -> Option<Record> {
        if self.index < self.data.len() {
            let item = self.data[self.index].clone();
            self.index += 1;
            Some(item)
        } else {
            None
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.data.len())
    }
}

// Blanket implementation for Box<dyn RecordSource>
impl RecordSource for Box<dyn RecordSource> {
    fn next(&mut self) -> Option<Record> {
        (**self).next()
    }

    fn size_hint(&self) -> Option<usize> {
        (**self).size_hint()
    }
}

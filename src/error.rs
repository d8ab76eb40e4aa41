//! Error types raised by the profiling pipeline.
//!
//! Only two stages can fail: ingestion (file access, decoding, row shape, cell types) and
//! aggregation (caller-supplied parameters). Schema inspection, classification
//! and null profiling are total over a valid [`Table`](crate::dataset::Table).

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::schema::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    NotFound,
    PermissionDenied,
    DecodeError,
    MalformedRow,
    TypeMismatch,
    Io,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Input file {path:?} not found")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("Malformed {encoding} byte sequence at byte offset {byte_offset}")]
    Decode {
        byte_offset: u64,
        encoding: &'static str,
    },

    #[error("Row on line {line} has {found} field(s); header declares {expected}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(
        "Column '{column}' was inferred as {expected} from the sampled rows, but line {line} \
         holds {value:?}; rerun with a larger inference sample (0 scans every row)"
    )]
    TypeMismatch {
        column: String,
        line: u64,
        value: String,
        expected: ColumnType,
    },

    #[error("Reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV parse failure: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::NotFound { .. } => IngestErrorKind::NotFound,
            IngestError::PermissionDenied { .. } => IngestErrorKind::PermissionDenied,
            IngestError::Decode { .. } => IngestErrorKind::DecodeError,
            IngestError::MalformedRow { .. } => IngestErrorKind::MalformedRow,
            IngestError::TypeMismatch { .. } => IngestErrorKind::TypeMismatch,
            IngestError::Io { .. } | IngestError::Csv { .. } => IngestErrorKind::Io,
        }
    }

    /// Maps a failed `open` on `path` onto the matching variant.
    pub(crate) fn from_open(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => IngestError::NotFound { path },
            io::ErrorKind::PermissionDenied => IngestError::PermissionDenied { path },
            _ => IngestError::Io { path, source: err },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationErrorKind {
    UnknownColumn,
    EmptyTable,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Column '{column}' not found in table")]
    UnknownColumn { column: String },

    #[error("Cannot group by '{column}': table has no rows")]
    EmptyTable { column: String },
}

impl AggregationError {
    pub fn kind(&self) -> AggregationErrorKind {
        match self {
            AggregationError::UnknownColumn { .. } => AggregationErrorKind::UnknownColumn,
            AggregationError::EmptyTable { .. } => AggregationErrorKind::EmptyTable,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Column '{column}' not found in table")]
    UnknownColumn { column: String },
}

impl From<SelectionError> for AggregationError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::UnknownColumn { column } => AggregationError::UnknownColumn { column },
        }
    }
}

/// Raised when a [`Table`](crate::dataset::Table) is assembled from
/// inconsistent parts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Column '{column}' has {found} value(s); expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' is {expected} but row {row} holds a {found} value")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: String,
        found: String,
    },

    #[error("Duplicate column name '{column}'")]
    DuplicateColumn { column: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_errors_map_to_kinds() {
        let path = PathBuf::from("missing.csv");
        let not_found = IngestError::from_open(path.clone(), io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(not_found.kind(), IngestErrorKind::NotFound);

        let denied =
            IngestError::from_open(path.clone(), io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(denied.kind(), IngestErrorKind::PermissionDenied);

        let other = IngestError::from_open(path, io::Error::other("disk on fire"));
        assert_eq!(other.kind(), IngestErrorKind::Io);
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = IngestError::Decode {
            byte_offset: 42,
            encoding: "UTF-8",
        };
        assert!(err.to_string().contains("byte offset 42"));

        let err = AggregationError::UnknownColumn {
            column: "giro".to_string(),
        };
        assert_eq!(err.kind(), AggregationErrorKind::UnknownColumn);
        assert!(err.to_string().contains("'giro'"));
    }
}

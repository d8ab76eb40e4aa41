//! CSV ingestion into a fully materialized [`Table`].
//!
//! The file is decoded with the configured encoding, cells matching a null
//! token (after trimming) become nulls, and column types are inferred from the
//! first `max_type_inference_rows` data rows. The sample decides the type and
//! later rows never revise it: a value past the sample that does not fit an
//! inferred numeric type fails ingestion with [`IngestError::TypeMismatch`].
//! Only null tokens ever become null cells.

use std::{collections::HashSet, io::Read, path::Path};

use encoding_rs::{Encoding, WINDOWS_1252};
use log::debug;

use crate::{
    data::parse_typed_value,
    dataset::{Column, Table},
    error::IngestError,
    io_utils,
    schema::TypeCandidate,
};

pub const DEFAULT_NULL_TOKENS: &[&str] = &["SN", "sn", "S/N", "s/n", "N/A", "n/a", ""];
pub const DEFAULT_INFER_ROWS: usize = 10_000;

/// Literal strings read as missing data. Matching is case-sensitive and
/// applies to the trimmed cell, never to substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullTokens {
    tokens: HashSet<String>,
}

impl NullTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(&self, raw: &str) -> bool {
        self.tokens.contains(raw.trim())
    }
}

impl Default for NullTokens {
    fn default() -> Self {
        Self::new(DEFAULT_NULL_TOKENS.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub encoding: &'static Encoding,
    /// `None` picks the delimiter from the file extension.
    pub delimiter: Option<u8>,
    pub null_tokens: NullTokens,
    /// Rows sampled per column for type inference; `0` scans every row.
    pub max_type_inference_rows: usize,
    /// Pad short rows with nulls and drop surplus fields instead of failing.
    pub allow_ragged: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            encoding: WINDOWS_1252,
            delimiter: None,
            null_tokens: NullTokens::default(),
            max_type_inference_rows: DEFAULT_INFER_ROWS,
            allow_ragged: false,
        }
    }
}

pub fn ingest(path: &Path, options: &IngestOptions) -> Result<Table, IngestError> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let table = read_table(&mut reader, options).map_err(|err| attach_path(err, path))?;
    debug!(
        "Ingested {} row(s) x {} column(s) from {:?}",
        table.row_count(),
        table.column_count(),
        path
    );
    Ok(table)
}

/// Ingests CSV text from any reader, e.g. an in-memory buffer.
pub fn ingest_reader<R: Read>(reader: R, options: &IngestOptions) -> Result<Table, IngestError> {
    let delimiter = options.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut reader = io_utils::open_csv_reader(reader, delimiter);
    read_table(&mut reader, options)
}

fn attach_path(err: IngestError, path: &Path) -> IngestError {
    match err {
        IngestError::Csv { source } if source.is_io_error() => match source.into_kind() {
            csv::ErrorKind::Io(io) => IngestError::Io {
                path: path.to_path_buf(),
                source: io,
            },
            kind => IngestError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other(format!("{kind:?}")),
            },
        },
        other => other,
    }
}

fn read_table<R: Read>(
    reader: &mut csv::Reader<R>,
    options: &IngestOptions,
) -> Result<Table, IngestError> {
    let headers = io_utils::reader_headers(reader, options.encoding)?;
    if headers.is_empty() {
        return Ok(Table::default());
    }
    let headers = deduplicate_headers(headers);
    let width = headers.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    let mut lines: Vec<u64> = Vec::new();
    let mut record = csv::ByteRecord::new();
    let mut rows = 0usize;
    while reader.read_byte_record(&mut record)? {
        if record.len() != width && !options.allow_ragged {
            return Err(IngestError::MalformedRow {
                line: record.position().map(|pos| pos.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }
        lines.push(record.position().map(|pos| pos.line()).unwrap_or(0));
        let decoded = io_utils::decode_record(&record, options.encoding)?;
        let mut fields = decoded.into_iter();
        for column in cells.iter_mut() {
            let cell = fields
                .next()
                .filter(|raw| !options.null_tokens.is_null(raw));
            column.push(cell);
        }
        rows += 1;
    }

    let sample = match options.max_type_inference_rows {
        0 => rows,
        limit => limit.min(rows),
    };
    debug!("Inferring column types from {sample} of {rows} row(s)");

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| build_column(name, raw, sample, &lines))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::from_parts(columns, rows))
}

/// `lines` holds the source line of every row, for error reporting.
fn build_column(
    name: String,
    raw: Vec<Option<String>>,
    sample: usize,
    lines: &[u64],
) -> Result<Column, IngestError> {
    let mut candidate = TypeCandidate::default();
    for value in raw.iter().take(sample).flatten() {
        candidate.update(value);
    }
    let column_type = candidate.decide();
    debug!("Column '{name}' inferred as {column_type}");

    let mut values = Vec::with_capacity(raw.len());
    for (row, cell) in raw.into_iter().enumerate() {
        let Some(text) = cell else {
            values.push(None);
            continue;
        };
        match parse_typed_value(&text, column_type) {
            Some(value) => values.push(Some(value)),
            None => {
                return Err(IngestError::TypeMismatch {
                    column: name,
                    line: lines.get(row).copied().unwrap_or(0),
                    value: text,
                    expected: column_type,
                });
            }
        }
    }
    Ok(Column::with_type(name, column_type, values))
}

/// Repeated header names get a `_duplicated_{n}` suffix so every column stays
/// addressable by name.
fn deduplicate_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|header| {
            let mut name = header.clone();
            let mut n = 0usize;
            while seen.contains(&name) {
                name = format!("{header}_duplicated_{n}");
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

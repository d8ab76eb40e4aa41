//! I/O utilities for opening registry extracts and decoding their bytes.
//!
//! - **Encoding**: labels resolve through `encoding_rs`; the default is
//!   `latin1`, which the WHATWG tables map onto windows-1252.
//! - **Delimiter**: extension-based detection (`.tsv` → tab, otherwise comma)
//!   unless the caller overrides it.
//! - **Decoding**: strict, without replacement characters. A malformed byte
//!   sequence is reported with its absolute offset in the file.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Result, anyhow};
use encoding_rs::{DecoderResult, Encoding, WINDOWS_1252};

use crate::error::IngestError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';
pub const DEFAULT_ENCODING_LABEL: &str = "latin1";

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(WINDOWS_1252),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Builds a reader that accepts ragged rows; field counts are checked by the
/// ingestor so it can report them with its own policy.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> std::result::Result<csv::Reader<BufReader<File>>, IngestError> {
    let file = File::open(path).map_err(|err| IngestError::from_open(path.to_path_buf(), err))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

/// Decodes `bytes` without replacement. On failure returns the offset of the
/// first malformed byte relative to the start of `bytes`.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> std::result::Result<String, usize> {
    if encoding == encoding_rs::UTF_8 || (encoding.is_ascii_compatible() && bytes.is_ascii()) {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|err| err.valid_up_to());
    }
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len().saturating_mul(3));
    let mut text = String::with_capacity(capacity);
    let mut consumed = 0usize;
    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut text, true);
        consumed += read;
        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => text.reserve(bytes.len() - consumed + 16),
            DecoderResult::Malformed(bad, pending) => {
                return Err(consumed - bad as usize - pending as usize);
            }
        }
    }
}

/// Decodes every field of `record`, mapping failures onto
/// [`IngestError::Decode`] with an absolute file offset.
pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> std::result::Result<Vec<String>, IngestError> {
    let record_start = record.position().map(|pos| pos.byte()).unwrap_or(0);
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            decode_strict(field, encoding).map_err(|offset| {
                let field_start = record.range(idx).map(|range| range.start).unwrap_or(0);
                IngestError::Decode {
                    // one delimiter byte precedes every field after the first
                    byte_offset: record_start + (field_start + idx + offset) as u64,
                    encoding: encoding.name(),
                }
            })
        })
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> std::result::Result<Vec<String>, IngestError>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

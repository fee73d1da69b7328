//! I/O helpers for reading price lists.
//!
//! Every price list flows through this module:
//!
//! - **Delimiter resolution**: extension-based detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: strict readers that reject rows whose field
//!   count differs from the header row.

use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Looks up an `encoding_rs` label such as `cp1251`; no label means UTF-8.
pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    let Some(label) = label.map(str::trim) else {
        return Ok(UTF_8);
    };
    Encoding::for_label(label.as_bytes()).ok_or_else(|| anyhow!("Unknown encoding '{label}'"))
}

/// `.tsv` files are tab-delimited, everything else comma-delimited, unless
/// the caller names a delimiter.
pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    if let Some(delimiter) = provided {
        return delimiter;
    }
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        DEFAULT_TSV_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    }
}

/// Price-list reader over raw bytes. A row whose cell count differs from the
/// header row is an error.
pub fn open_csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening price list {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

/// Decodes one cell, failing on bytes that are invalid in `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok(text.into_owned()),
        None => Err(anyhow!("Bytes are not valid {}", encoding.name())),
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            decode_bytes(cell, encoding).with_context(|| format!("Decoding cell {}", idx + 1))
        })
        .collect()
}

/// Decoded header row with a leading byte order mark removed.
pub fn reader_headers<R: Read>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>> {
    let raw = reader.byte_headers()?.clone();
    let mut headers = decode_record(&raw, encoding)?;
    if let Some(first) = headers.first_mut() {
        if first.starts_with('\u{feff}') {
            first.remove(0);
        }
    }
    Ok(headers)
}

/// Writes `contents` to `path`, creating missing parent directories first.
pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory {parent:?}"))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("Writing output file {path:?}"))
}

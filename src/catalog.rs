//! In-memory catalog of normalized price-list entries.
//!
//! A [`Catalog`] is filled by [`Catalog::load`], which replaces whatever a
//! previous pass loaded, and is then queried with [`Catalog::search`]. Row and
//! file problems never abort a load; they are collected into the returned
//! [`LoadReport`] and logged as warnings.

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};
use regex::RegexBuilder;
use thiserror::Error;

use crate::{
    fields::{FieldMap, RawRecord},
    io_utils,
    normalize::{CatalogEntry, normalize_mapped},
};

/// How price lists are read.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Overrides the extension-based delimiter when set.
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    File,
    Row,
}

/// A skipped file or row with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub source: String,
    /// 1-based line number of a skipped row.
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} line {}: {}", self.source, line, self.message),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} row(s) from {} file(s); skipped {} row(s) and {} file(s)",
            self.rows_loaded, self.files_loaded, self.rows_skipped, self.files_skipped
        )
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the catalog contents with the rows of `paths`.
    pub fn load<P>(&mut self, paths: &[P], options: &ReadOptions) -> LoadReport
    where
        P: AsRef<Path>,
    {
        self.entries.clear();
        let mut report = LoadReport::default();
        for path in paths {
            let path = path.as_ref();
            let source_id = path.display().to_string();
            let mut staged = Vec::new();
            match read_price_list(path, &source_id, options, &mut staged, &mut report) {
                Ok(()) => {
                    info!("✓ Loaded {} row(s) from {:?}", staged.len(), path);
                    report.files_loaded += 1;
                    report.rows_loaded += staged.len();
                    self.entries.append(&mut staged);
                }
                Err(err) => {
                    warn!("Skipping {path:?}: {err:#}");
                    report.files_skipped += 1;
                    report.diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::File,
                        source: source_id,
                        line: None,
                        message: format!("{err:#}"),
                    });
                }
            }
        }
        info!("{report}");
        report
    }

    /// Entries whose name matches `query` case-insensitively, cheapest per
    /// unit first. Ties keep catalog order.
    pub fn search(&self, query: &str) -> Result<Vec<&CatalogEntry>, QueryError> {
        let pattern = RegexBuilder::new(query)
            .case_insensitive(true)
            .build()
            .map_err(|source| QueryError::InvalidPattern {
                pattern: query.to_string(),
                source,
            })?;
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| pattern.is_match(&entry.name))
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        debug!("Query '{query}' matched {} entr(ies)", matches.len());
        Ok(matches)
    }

    /// Stable in-place sort of the whole catalog by price per unit.
    pub fn sort_all_by_ratio(&mut self) {
        self.entries.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn read_price_list(
    path: &Path,
    source_id: &str,
    options: &ReadOptions,
    staged: &mut Vec<CatalogEntry>,
    report: &mut LoadReport,
) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, options.encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?;
    let map = FieldMap::from_headers(&headers);
    let missing = map.missing();
    if !missing.is_empty() {
        debug!("{path:?} has no column for {missing:?}; headers {headers:?}");
    }

    // Row counts merge into the pass report only once the whole file is read.
    let mut file_report = LoadReport::default();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading record {} in {path:?}", row_idx + 1))?;
        // Quoted cells may span lines, so the record index is not the line.
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(row_idx + 2);
        let values = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {line} in {path:?}"))?;
        let raw = RawRecord::new(&headers, &values);
        if let Some(entry) = admit_row(source_id, &map, &raw, line, &mut file_report) {
            staged.push(entry);
        }
    }
    report.rows_skipped += file_report.rows_skipped;
    report.diagnostics.append(&mut file_report.diagnostics);
    Ok(())
}

fn admit_row(
    source_id: &str,
    map: &FieldMap,
    record: &RawRecord<'_>,
    line: usize,
    report: &mut LoadReport,
) -> Option<CatalogEntry> {
    match normalize_mapped(source_id, map, record) {
        Ok(entry) => Some(entry),
        Err(failure) => {
            warn!("{source_id} line {line}: {failure}");
            report.rows_skipped += 1;
            report.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::Row,
                source: source_id.to_string(),
                line: Some(line),
                message: failure.to_string(),
            });
            None
        }
    }
}

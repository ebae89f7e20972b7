use crate::config::ColumnConfig;
use crate::error::{DashboardError, Result};
use crate::types::Record;
use crate::util::{clean_cell, parse_day_first, parse_submission_timestamp};
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Latin1,
}

/// Recoverable conditions met while loading. None of them stop the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    Latin1Fallback,
    MissingColumn(String),
    UnparsedTimestamps { column: String, count: usize },
    SkippedRows(usize),
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub encoding: SourceEncoding,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Time filters have nothing to offer when the submission timestamp
    /// column is absent.
    pub fn missing_submission_timestamps(&self, cfg: &ColumnConfig) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LoadWarning::MissingColumn(c) if *c == cfg.submission_timestamp))
    }
}

pub fn load_path(path: &Path, cfg: &ColumnConfig) -> Result<(Vec<Record>, LoadReport)> {
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, cfg)
}

/// Decode as UTF-8, falling back to Latin-1. Latin-1 maps every byte, so the
/// fallback only refuses input that is clearly binary (NUL bytes).
pub fn decode(bytes: &[u8]) -> Result<(String, SourceEncoding)> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok((s.trim_start_matches('\u{feff}').to_string(), SourceEncoding::Utf8)),
        Err(_) => {
            if bytes.contains(&0) {
                return Err(DashboardError::Encoding);
            }
            Ok((bytes.iter().map(|&b| b as char).collect(), SourceEncoding::Latin1))
        }
    }
}

pub fn load_bytes(bytes: &[u8], cfg: &ColumnConfig) -> Result<(Vec<Record>, LoadReport)> {
    let (text, encoding) = decode(bytes)?;
    let mut warnings = Vec::new();
    if encoding == SourceEncoding::Latin1 {
        warn!("input is not valid UTF-8; decoded as Latin-1");
        warnings.push(LoadWarning::Latin1Fallback);
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers, cfg);
    let required = [
        (&cfg.submission_timestamp, cols.submission_timestamp),
        (&cfg.process_identifier, cols.process_identifier),
        (&cfg.submission_kind, cols.submission_kind),
        (&cfg.review_timestamp, cols.review_timestamp),
    ];
    for (name, idx) in required {
        if idx.is_none() {
            warn!("column '{name}' not found in the uploaded file");
            warnings.push(LoadWarning::MissingColumn(name.clone()));
        }
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut bad_submitted = 0usize;
    let mut bad_reviewed = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.records() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => { parse_errors += 1; continue; }
        };

        let submitted_raw = cols.cell(&row, cols.submission_timestamp);
        let submitted_at = parse_submission_timestamp(submitted_raw.as_deref());
        if submitted_raw.is_some() && submitted_at.is_none() {
            bad_submitted += 1;
        }
        let reviewed_raw = cols.cell(&row, cols.review_timestamp);
        let reviewed_at = parse_day_first(reviewed_raw.as_deref());
        if reviewed_raw.is_some() && reviewed_at.is_none() {
            bad_reviewed += 1;
        }

        records.push(Record {
            process_identifier: cols.cell(&row, cols.process_identifier),
            submitted_at,
            reviewed_at,
            submission_kind: cols.cell(&row, cols.submission_kind),
            technical_info: cols.cell(&row, cols.technical_info),
            analyst: cols.cell(&row, cols.analyst),
            reviewer: cols.cell(&row, cols.reviewer),
            post_review_status: cols.cell(&row, cols.post_review_status),
            enterprise_type: cols.cell(&row, cols.enterprise_type),
            review_year_raw: cols.cell(&row, cols.review_year),
            review_month_raw: cols.cell(&row, cols.review_month),
            ..Default::default()
        });
    }

    if parse_errors > 0 {
        warn!("{parse_errors} rows could not be read and were skipped");
        warnings.push(LoadWarning::SkippedRows(parse_errors));
    }
    for (column, count) in [(&cfg.submission_timestamp, bad_submitted), (&cfg.review_timestamp, bad_reviewed)] {
        if count > 0 {
            warn!("{count} values in '{column}' could not be parsed and were treated as missing");
            warnings.push(LoadWarning::UnparsedTimestamps { column: column.clone(), count });
        }
    }

    if records.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }
    info!("loaded {} records ({} rows read, {:?})", records.len(), total_rows, encoding);
    let report = LoadReport { total_rows, parse_errors, encoding, warnings };
    Ok((records, report))
}

/// Header positions of the configured columns.
struct Columns {
    submission_timestamp: Option<usize>,
    process_identifier: Option<usize>,
    submission_kind: Option<usize>,
    technical_info: Option<usize>,
    analyst: Option<usize>,
    reviewer: Option<usize>,
    review_timestamp: Option<usize>,
    post_review_status: Option<usize>,
    enterprise_type: Option<usize>,
    review_year: Option<usize>,
    review_month: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, cfg: &ColumnConfig) -> Self {
        let find = |name: &str| find_header(headers, name);
        Self {
            submission_timestamp: find(&cfg.submission_timestamp),
            process_identifier: find(&cfg.process_identifier),
            submission_kind: find(&cfg.submission_kind),
            technical_info: find(&cfg.technical_info),
            analyst: find(&cfg.analyst),
            reviewer: find(&cfg.reviewer),
            review_timestamp: find(&cfg.review_timestamp),
            post_review_status: find(&cfg.post_review_status),
            enterprise_type: find(&cfg.enterprise_type),
            review_year: find(&cfg.review_year),
            review_month: find(&cfg.review_month),
        }
    }

    fn cell(&self, row: &StringRecord, idx: Option<usize>) -> Option<String> {
        clean_cell(row.get(idx?))
    }
}

fn find_header(headers: &StringRecord, name: &str) -> Option<usize> {
    let wanted = name.trim();
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
}

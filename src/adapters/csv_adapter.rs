//! CSV file price source.
//!
//! Reads one file per symbol and session, named `{SYMBOL}_{YYYY-MM-DD}.csv`
//! under a base directory. Columns are found by header name; only `date` and
//! `close` are required.

use crate::domain::bar::Bar;
use crate::domain::error::TradesimError;
use crate::ports::price_source::PriceSource;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_COLUMN: &str = "date";
const CLOSE_COLUMN: &str = "close";

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Shape of a price file, for previews.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInfo {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, session: NaiveDate) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol, session.format("%Y-%m-%d")))
    }

    /// Read and validate bars from an explicit file path.
    pub fn read_file(path: &Path) -> Result<Vec<Bar>, TradesimError> {
        let (columns, mut bars) = read_series(path)?;

        info!(
            path = %path.display(),
            rows = bars.len(),
            columns = %columns.join(", "),
            "loaded price file"
        );
        for bar in bars.iter().take(5) {
            debug!(time = %bar.timestamp, close = bar.close, "preview");
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    pub fn describe(path: &Path) -> Result<SeriesInfo, TradesimError> {
        let (columns, bars) = read_series(path)?;
        Ok(SeriesInfo {
            path: path.to_path_buf(),
            columns,
            rows: bars.len(),
            first: bars.iter().map(|b| b.timestamp).min(),
            last: bars.iter().map(|b| b.timestamp).max(),
        })
    }
}

impl PriceSource for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, session: NaiveDate) -> Result<Vec<Bar>, TradesimError> {
        Self::read_file(&self.csv_path(symbol, session))
    }
}

fn read_series(path: &Path) -> Result<(Vec<String>, Vec<Bar>), TradesimError> {
    let content = fs::read_to_string(path).map_err(|e| TradesimError::SourceUnavailable {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| TradesimError::SourceUnavailable {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?
        .clone();
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let date_idx = column_index(&columns, DATE_COLUMN)?;
    let close_idx = column_index(&columns, CLOSE_COLUMN)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| TradesimError::SourceUnavailable {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(date_idx).unwrap_or_default();
        let timestamp =
            parse_timestamp(date_str).ok_or_else(|| TradesimError::SourceUnavailable {
                reason: format!("row {}: invalid timestamp '{}'", row + 1, date_str),
            })?;

        let close_str = record.get(close_idx).unwrap_or_default().trim();
        let close: f64 = close_str.parse().map_err(|e| TradesimError::SourceUnavailable {
            reason: format!("row {}: invalid close value '{}': {}", row + 1, close_str, e),
        })?;

        bars.push(Bar { timestamp, close });
    }

    Ok((columns, bars))
}

fn column_index(columns: &[String], name: &str) -> Result<usize, TradesimError> {
    columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
        .ok_or_else(|| TradesimError::InsufficientData {
            reason: format!("missing required column '{}'", name),
        })
}

/// Parse a bar timestamp. A trailing UTC offset is dropped, keeping the
/// exchange-local wall-clock time; a bare date maps to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

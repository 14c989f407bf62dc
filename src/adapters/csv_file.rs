//! CSV price history source
//!
//! Reads `<data_dir>/<SYMBOL>.csv` daily histories. Two layouts are accepted:
//!
//! - flat: `Date,Open,High,Low,Close,Adj Close,Volume`
//! - two-level, as written by yfinance for grouped downloads:
//!
//! ```text
//! Price,Close,High,Low,Open,Volume
//! Ticker,SPY,SPY,SPY,SPY,SPY
//! Date,,,,,
//! 2024-01-02,472.65,473.67,470.49,472.16,123623700
//! ```
//!
//! The first column is always the day. Empty cells and `NaN` are missing
//! values; the normalizer decides what to do with them.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::RawFrame;
use crate::ports::{HistoryQuery, MarketDataError, PriceHistoryPort};

/// Directory of per-symbol CSV files
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    dir: PathBuf,
}

impl CsvHistorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Existing file for `symbol`, trying the name as given and then upper-cased
    pub fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        [symbol.to_string(), symbol.to_uppercase()]
            .into_iter()
            .map(|name| self.dir.join(format!("{}.csv", name)))
            .find(|p| p.is_file())
    }
}

#[async_trait]
impl PriceHistoryPort for CsvHistorySource {
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<RawFrame, MarketDataError> {
        let path = self
            .path_for(&query.symbol)
            .ok_or_else(|| MarketDataError::NotFound(query.symbol.clone()))?;

        tracing::debug!("Reading {} history from {}", query.symbol, path.display());
        let bytes = tokio::fs::read(&path).await?;
        let frame = parse_frame(bytes.as_slice())?;

        tracing::info!(
            "Loaded {} rows for {} ({} columns)",
            frame.row_count(),
            query.symbol,
            frame.columns().len()
        );
        Ok(frame.slice_days(query.start, query.end))
    }
}

/// Parse a flat or two-level CSV history
pub fn parse_frame<R: Read>(reader: R) -> Result<RawFrame, MarketDataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut frame: Option<RawFrame> = None;

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let first = record.get(0).unwrap_or("");

        let Some(day) = parse_day(first) else {
            if frame.is_some() {
                return Err(MarketDataError::Parse(format!(
                    "line {}: expected a date, got '{}'",
                    line + 1,
                    first
                )));
            }
            // "Date,,,," spacer below a two-level header
            if !header_rows.is_empty() && record.iter().skip(1).all(|c| c.is_empty()) {
                continue;
            }
            header_rows.push(record.iter().skip(1).map(str::to_string).collect());
            continue;
        };

        if frame.is_none() {
            frame = Some(frame_from_headers(&header_rows)?);
        }
        if let Some(frame) = frame.as_mut() {
            let values = record
                .iter()
                .skip(1)
                .map(|cell| parse_value(cell, line + 1))
                .collect::<Result<Vec<_>, _>>()?;
            frame
                .push_row(day, values)
                .map_err(|e| MarketDataError::Parse(format!("line {}: {}", line + 1, e)))?;
        }
    }

    match frame {
        Some(frame) => Ok(frame),
        None => frame_from_headers(&header_rows),
    }
}

fn frame_from_headers(header_rows: &[Vec<String>]) -> Result<RawFrame, MarketDataError> {
    match header_rows {
        [] => Err(MarketDataError::Parse("missing header row".to_string())),
        [flat] => Ok(RawFrame::from_header_levels(flat.clone(), None)),
        [first, second, ..] => Ok(RawFrame::from_header_levels(
            first.clone(),
            Some(second.clone()),
        )),
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part, or `MM/DD/YYYY`
pub fn parse_day(cell: &str) -> Option<NaiveDate> {
    let date_part = cell.split(|c| c == ' ' || c == 'T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .ok()
}

fn parse_value(cell: &str, line: usize) -> Result<Option<f64>, MarketDataError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| MarketDataError::Parse(format!("line {}: invalid number '{}'", line, cell)))
}

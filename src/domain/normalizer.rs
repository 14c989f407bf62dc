//! Price Series Normalizer
//!
//! Absorbs the column-shape quirks of upstream price providers. A raw frame
//! may arrive flat (`Close`, `High`, ...) or with a second header level that
//! groups fields by symbol (`(Close, SPY)` or `(SPY, Close)`). Everything
//! downstream only ever sees single-symbol, day-aligned series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bar::OhlcBar;
use super::error::AnalysisError;
use super::series::PriceSeries;

/// Price fields understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::AdjClose => "Adj Close",
            Field::Volume => "Volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "open" => Ok(Field::Open),
            "high" => Ok(Field::High),
            "low" => Ok(Field::Low),
            "close" => Ok(Field::Close),
            "adjclose" => Ok(Field::AdjClose),
            "volume" => Ok(Field::Volume),
            _ => Err(format!("Unknown price field: {}", s)),
        }
    }
}

/// One raw column header: a field name, optionally grouped under a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnKey {
    pub field: String,
    pub symbol: Option<String>,
}

impl ColumnKey {
    pub fn flat(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            symbol: None,
        }
    }

    pub fn grouped(field: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            symbol: Some(symbol.into()),
        }
    }

    fn parsed_field(&self) -> Option<Field> {
        self.field.parse().ok()
    }
}

/// Raw per-day records exactly as delivered by a provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    columns: Vec<ColumnKey>,
    rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl RawFrame {
    pub fn new(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build column keys from one or two header rows
    ///
    /// With two levels, the level whose labels parse as price fields is the
    /// field level and the other one is the symbol level. Ties go to the
    /// first-listed level.
    pub fn from_header_levels(first: Vec<String>, second: Option<Vec<String>>) -> Self {
        let columns = match second {
            None => first.into_iter().map(ColumnKey::flat).collect(),
            Some(second) => {
                let score = |level: &[String]| {
                    level.iter().filter(|s| s.parse::<Field>().is_ok()).count()
                };
                let (fields, symbols) = if score(&second) > score(&first) {
                    (second, first)
                } else {
                    (first, second)
                };
                fields
                    .into_iter()
                    .zip(symbols)
                    .map(|(f, s)| {
                        if s.trim().is_empty() {
                            ColumnKey::flat(f)
                        } else {
                            ColumnKey::grouped(f, s)
                        }
                    })
                    .collect()
            }
        };
        Self::new(columns)
    }

    /// Append a day of values; non-finite values are treated as missing
    pub fn push_row(&mut self, day: NaiveDate, values: Vec<Option<f64>>) -> Result<(), AnalysisError> {
        if values.len() != self.columns.len() {
            return Err(AnalysisError::LengthMismatch {
                left: self.columns.len(),
                right: values.len(),
            });
        }
        let values = values.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
        self.rows.push((day, values));
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when headers carry a symbol grouping level
    pub fn is_grouped(&self) -> bool {
        self.columns.iter().any(|c| c.symbol.is_some())
    }

    /// Only rows whose day falls in `[start, end]`
    pub fn slice_days(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> RawFrame {
        let rows = self
            .rows
            .iter()
            .filter(|(d, _)| start.map_or(true, |s| *d >= s) && end.map_or(true, |e| *d <= e))
            .cloned()
            .collect();
        RawFrame {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Position of the column holding `field`
    ///
    /// A column grouped under `symbol` wins; otherwise the first-listed
    /// column carrying that field name is used.
    pub fn column_position(&self, field: Field, symbol: Option<&str>) -> Option<usize> {
        let matches: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parsed_field() == Some(field))
            .map(|(i, _)| i)
            .collect();

        if let Some(sym) = symbol {
            if let Some(&i) = matches.iter().find(|&&i| {
                self.columns[i]
                    .symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(sym))
            }) {
                return Some(i);
            }
        }
        matches.first().copied()
    }

    fn missing_field(&self, field: Field) -> AnalysisError {
        let available = self
            .columns
            .iter()
            .map(|c| match &c.symbol {
                Some(s) => format!("({}, {})", c.field, s),
                None => c.field.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        AnalysisError::MissingField {
            field: field.to_string(),
            available,
        }
    }

    /// Rows sorted by day with duplicate days collapsed to the last occurrence
    fn ordered_rows(&self) -> Vec<&(NaiveDate, Vec<Option<f64>>)> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by_key(|(d, _)| *d);
        let before = rows.len();
        let mut deduped: Vec<&(NaiveDate, Vec<Option<f64>>)> = Vec::with_capacity(rows.len());
        for row in rows {
            match deduped.last_mut() {
                Some(last) if last.0 == row.0 => *last = row,
                _ => deduped.push(row),
            }
        }
        if deduped.len() < before {
            tracing::warn!(
                "Dropped {} duplicate trading day(s) from raw history",
                before - deduped.len()
            );
        }
        deduped
    }

    /// Intersect the days where every requested field has a value
    pub fn align(&self, fields: &[Field], symbol: Option<&str>) -> Result<AlignedFields, AnalysisError> {
        let positions = fields
            .iter()
            .map(|&f| self.column_position(f, symbol).ok_or_else(|| self.missing_field(f)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut days = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); fields.len()];

        for (day, values) in self.ordered_rows() {
            let picked: Option<Vec<f64>> = positions.iter().map(|&p| values[p]).collect();
            if let Some(picked) = picked {
                days.push(*day);
                for (col, v) in columns.iter_mut().zip(picked) {
                    col.push(v);
                }
            }
        }

        if days.is_empty() {
            let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
            return Err(AnalysisError::DataUnavailable(format!(
                "no trading day has all of [{}]",
                names.join(", ")
            )));
        }

        tracing::debug!(
            "Aligned {} of {} raw rows on fields {:?}",
            days.len(),
            self.rows.len(),
            fields
        );

        Ok(AlignedFields {
            days,
            fields: fields.to_vec(),
            columns,
        })
    }

    /// Single field as a clean series (days missing that field dropped)
    pub fn series(&self, field: Field, symbol: Option<&str>) -> Result<PriceSeries, AnalysisError> {
        self.align(&[field], symbol)?.series(field)
    }

    /// High/Low/Close on their common days
    pub fn ohlc(&self, symbol: Option<&str>) -> Result<AlignedOhlc, AnalysisError> {
        let aligned = self.align(&[Field::High, Field::Low, Field::Close], symbol)?;
        let open = self.column_position(Field::Open, symbol);
        let open_by_day: Option<std::collections::HashMap<NaiveDate, f64>> = open.map(|p| {
            self.rows
                .iter()
                .filter_map(|(d, v)| v[p].map(|x| (*d, x)))
                .collect()
        });

        let bars: Vec<OhlcBar> = (0..aligned.len())
            .map(|i| {
                let day = aligned.days[i];
                let mut bar = OhlcBar::new(
                    day,
                    aligned.columns[0][i],
                    aligned.columns[1][i],
                    aligned.columns[2][i],
                );
                bar.open = open_by_day.as_ref().and_then(|m| m.get(&day).copied());
                bar
            })
            .collect();

        let total = bars.len();
        let bars: Vec<OhlcBar> = bars.into_iter().filter(OhlcBar::is_valid).collect();
        if bars.len() < total {
            tracing::warn!(
                "Dropped {} of {} bar(s) violating low <= open/close <= high",
                total - bars.len(),
                total
            );
        }
        if bars.is_empty() {
            return Err(AnalysisError::DataUnavailable(
                "no bar satisfies low <= close <= high".to_string(),
            ));
        }

        Ok(AlignedOhlc { bars })
    }
}

/// Columns restricted to the days where all of them are present
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFields {
    days: Vec<NaiveDate>,
    fields: Vec<Field>,
    columns: Vec<Vec<f64>>,
}

impl AlignedFields {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn values(&self, field: Field) -> Option<&[f64]> {
        let i = self.fields.iter().position(|&f| f == field)?;
        Some(&self.columns[i])
    }

    pub fn series(&self, field: Field) -> Result<PriceSeries, AnalysisError> {
        let values = self.values(field).ok_or_else(|| AnalysisError::MissingField {
            field: field.to_string(),
            available: format!("{:?}", self.fields),
        })?;
        PriceSeries::new(self.days.clone(), values.to_vec())
    }
}

/// Day-aligned High/Low/Close history for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedOhlc {
    bars: Vec<OhlcBar>,
}

impl AlignedOhlc {
    pub fn from_bars(bars: Vec<OhlcBar>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::DataUnavailable("empty bar history".to_string()));
        }
        if let Some(w) = bars.windows(2).find(|w| w[1].day <= w[0].day) {
            return Err(AnalysisError::InvalidSeries(format!(
                "bars out of order ({} then {})",
                w[0].day, w[1].day
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.day).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn close_series(&self) -> Result<PriceSeries, AnalysisError> {
        PriceSeries::new(self.days(), self.closes())
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.bars.first()?.day, self.bars.last()?.day))
    }
}

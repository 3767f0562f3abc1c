//! Price series loading from long-format CSV.
//!
//! Each row holds one observation: an optional series id, a time value and a
//! price. Rows are grouped by series (first-appearance order) and sorted by
//! time within each series. Blank, `NA`, `NaN` and `null` prices are missing
//! observations and load as `NaN`.
//!
//! Loading does not enforce the engine preconditions (length, uniqueness of
//! time values). The batch runner validates each series on its own so that
//! one bad series does not abort the whole file.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::config::{InputConfig, TimeFormat};

/// Series id used when the input has no series column.
pub const DEFAULT_SERIES_ID: &str = "series";

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column '{column}' not found in header")]
    MissingColumn { column: String },

    #[error("row {row}: cannot parse time value '{value}'")]
    BadTime { row: usize, value: String },

    #[error("row {row}: cannot parse price '{value}'")]
    BadPrice { row: usize, value: String },

    #[error("input contains no rows")]
    Empty,
}

/// One series as read from the input, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub id: String,
    pub time_index: Vec<i64>,
    pub prices: Vec<f64>,
}

impl LoadedSeries {
    pub fn len(&self) -> usize {
        self.time_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_index.is_empty()
    }
}

/// Load every series from a CSV file.
pub fn load_csv(path: &Path, input: &InputConfig) -> Result<Vec<LoadedSeries>, LoadError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    read_series(reader, input)
}

/// Load every series from any CSV reader (header row required).
pub fn read_series<R: Read>(
    mut reader: csv::Reader<R>,
    input: &InputConfig,
) -> Result<Vec<LoadedSeries>, LoadError> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                column: name.to_string(),
            })
    };
    let time_col = column(&input.time_column)?;
    let price_col = column(&input.price_column)?;
    let series_col = input.series_column.as_deref().map(column).transpose()?;

    let mut order: Vec<String> = Vec::new();
    let mut rows: HashMap<String, Vec<(i64, f64)>> = HashMap::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;
        let field = |col: usize| record.get(col).unwrap_or("");

        let time = parse_time(field(time_col), input)
            .ok_or_else(|| LoadError::BadTime {
                row,
                value: field(time_col).to_string(),
            })?;
        let price = parse_price(field(price_col)).ok_or_else(|| LoadError::BadPrice {
            row,
            value: field(price_col).to_string(),
        })?;
        let id = series_col.map_or(DEFAULT_SERIES_ID, field);

        match rows.get_mut(id) {
            Some(obs) => obs.push((time, price)),
            None => {
                order.push(id.to_string());
                rows.insert(id.to_string(), vec![(time, price)]);
            }
        }
    }

    if order.is_empty() {
        return Err(LoadError::Empty);
    }

    let series = order
        .into_iter()
        .map(|id| {
            let mut obs = rows.remove(&id).unwrap_or_default();
            obs.sort_by_key(|&(t, _)| t);
            let (time_index, prices) = obs.into_iter().unzip();
            LoadedSeries {
                id,
                time_index,
                prices,
            }
        })
        .collect();
    Ok(series)
}

fn parse_time(value: &str, input: &InputConfig) -> Option<i64> {
    match input.time_format {
        TimeFormat::Integer => value.parse().ok(),
        TimeFormat::Date => NaiveDate::parse_from_str(value, &input.date_format)
            .ok()
            .map(|d| i64::from(d.num_days_from_ce())),
    }
}

/// Missing markers give `NaN`; anything else must be a finite number.
fn parse_price(value: &str) -> Option<f64> {
    const MISSING: [&str; 4] = ["", "na", "nan", "null"];
    if MISSING.iter().any(|m| value.eq_ignore_ascii_case(m)) {
        return Some(f64::NAN);
    }
    value.parse::<f64>().ok().filter(|p| p.is_finite())
}

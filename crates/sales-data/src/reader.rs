//! CSV loading and preprocessing for sales exports.
//!
//! [`DataReader`] reads a delimited source into a [`RawTable`], then turns it
//! into the canonical [`SalesTable`]: dates parsed, duplicate rows dropped,
//! missing values filled, calendar fields derived.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use csv::StringRecord;
use sales_core::dates::DateParser;
use sales_core::error::{InsightError, Result};
use sales_core::models::{columns, RawRecord, RawTable, SalesRecord, DERIVED_COLUMNS, REQUIRED_COLUMNS};
use sales_core::table::SalesTable;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::mean;

/// Cell values treated as missing, in addition to the empty string.
pub const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ── PreprocessStats ───────────────────────────────────────────────────────────

/// What preprocessing changed, for logging and run metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessStats {
    pub rows_loaded: usize,
    pub rows_kept: usize,
    pub duplicates_removed: usize,
    pub discount_filled: usize,
    pub profit_filled: usize,
    pub forecast_filled: usize,
    /// Mean of present `Sales`, set only when a forecast cell needed filling.
    pub forecast_fill_value: Option<f64>,
}

// ── DataReader ────────────────────────────────────────────────────────────────

/// Single-use loader for one sales source.
///
/// Call [`load`](Self::load) (or [`load_from_reader`](Self::load_from_reader))
/// then [`preprocess`](Self::preprocess); the canonical table is then
/// available from [`get`](Self::get) or [`into_table`](Self::into_table).
#[derive(Debug, Default)]
pub struct DataReader {
    source: Option<PathBuf>,
    raw: Option<RawTable>,
    table: Option<SalesTable>,
    stats: Option<PreprocessStats>,
}

impl DataReader {
    /// Bind a reader to the CSV file at `path`.  Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            ..Self::default()
        }
    }

    /// The bound source path, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Read the bound file into memory, preserving row order and column names.
    ///
    /// Fails with an I/O error when the file cannot be opened and a format
    /// error when the CSV is malformed, a required column is absent, or a
    /// numeric cell does not parse.
    pub fn load(&mut self) -> Result<&RawTable> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| InsightError::State("No source path bound to reader.".to_string()))?;

        let file = File::open(&path).map_err(|source| InsightError::FileRead {
            path: path.clone(),
            source,
        })?;

        debug!("Loading sales data from {}", path.display());
        self.load_from_reader(file)
    }

    /// Like [`load`](Self::load), reading from any byte source.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<&RawTable> {
        let raw = read_raw_table(reader)?;
        debug!(
            "Loaded {} rows ({} extra columns)",
            raw.len(),
            raw.extra_columns.len()
        );
        let raw: &RawTable = self.raw.insert(raw);
        Ok(raw)
    }

    /// Clean the loaded data into the canonical table.
    ///
    /// Fails with a state error when nothing has been loaded.
    pub fn preprocess(&mut self) -> Result<&SalesTable> {
        let raw = self
            .raw
            .as_ref()
            .ok_or_else(|| InsightError::State("Data not loaded. Call load() first.".to_string()))?;

        let (table, stats) = preprocess_table(raw)?;

        info!(
            "Preprocessed {} rows: {} duplicates removed, filled {} Discount / {} Profit / {} SalesForecast",
            stats.rows_loaded,
            stats.duplicates_removed,
            stats.discount_filled,
            stats.profit_filled,
            stats.forecast_filled,
        );

        self.stats = Some(stats);
        let table: &SalesTable = self.table.insert(table);
        Ok(table)
    }

    /// The last preprocessed table.
    pub fn get(&self) -> Result<&SalesTable> {
        self.table.as_ref().ok_or_else(not_preprocessed)
    }

    /// Consume the reader and return the last preprocessed table.
    pub fn into_table(self) -> Result<SalesTable> {
        self.table.ok_or_else(not_preprocessed)
    }

    /// Statistics from the last preprocess run.
    pub fn stats(&self) -> Option<&PreprocessStats> {
        self.stats.as_ref()
    }
}

fn not_preprocessed() -> InsightError {
    InsightError::State("Data not preprocessed. Call preprocess() first.".to_string())
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Where each schema column sits in the source header.
struct ColumnLayout {
    required: [usize; REQUIRED_COLUMNS.len()],
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(InsightError::MissingColumns(missing));
        }

        let extras = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| !required.contains(idx) && !DERIVED_COLUMNS.contains(name))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        Ok(Self { required, extras })
    }

    fn cell<'r>(&self, row: &'r StringRecord, column: usize) -> Option<&'r str> {
        row.get(self.required[column]).filter(|v| !is_missing(v))
    }

    fn text(&self, row: &StringRecord, column: usize) -> Option<String> {
        self.cell(row, column).map(str::to_string)
    }

    fn number(&self, row: &StringRecord, column: usize, row_no: usize) -> Result<Option<f64>> {
        let Some(value) = self.cell(row, column) else {
            return Ok(None);
        };
        match value.parse::<f64>() {
            Ok(n) if n.is_nan() => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(InsightError::InvalidNumber {
                row: row_no,
                column: REQUIRED_COLUMNS[column],
                value: value.to_string(),
            }),
        }
    }

    fn to_raw_record(&self, row: &StringRecord, row_no: usize) -> Result<RawRecord> {
        Ok(RawRecord {
            order_id: self.text(row, 0).unwrap_or_default(),
            order_date: self.text(row, 1),
            ship_date: self.text(row, 2),
            sales: self.number(row, 3, row_no)?,
            profit: self.number(row, 4, row_no)?,
            sales_forecast: self.number(row, 5, row_no)?,
            discount: self.number(row, 6, row_no)?,
            profit_ratio: self.number(row, 7, row_no)?,
            days_to_ship_actual: self.number(row, 8, row_no)?,
            ship_status: self.text(row, 9),
            category: self.text(row, 10),
            region: self.text(row, 11),
            customer_name: self.text(row, 12),
            extra: self
                .extras
                .iter()
                .map(|(idx, _)| row.get(*idx).filter(|v| !is_missing(v)).map(str::to_string))
                .collect(),
        })
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || NA_MARKERS.contains(&value)
}

fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = result?;
        records.push(layout.to_raw_record(&row, idx + 1)?);
    }

    Ok(RawTable {
        extra_columns: layout.extras.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}

// ── Preprocessing ─────────────────────────────────────────────────────────────

/// A loaded row whose dates have been parsed.
struct DatedRow<'a> {
    raw: &'a RawRecord,
    order_date: NaiveDateTime,
    ship_date: NaiveDateTime,
}

/// Full-row identity used for duplicate removal.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    order_id: &'a str,
    order_date: NaiveDateTime,
    ship_date: NaiveDateTime,
    numbers: [Option<u64>; 6],
    text: [Option<&'a str>; 4],
    extra: &'a [Option<String>],
}

impl<'a> DatedRow<'a> {
    fn key(&self) -> RowKey<'a> {
        let r = self.raw;
        RowKey {
            order_id: &r.order_id,
            order_date: self.order_date,
            ship_date: self.ship_date,
            numbers: [
                number_bits(r.sales),
                number_bits(r.profit),
                number_bits(r.sales_forecast),
                number_bits(r.discount),
                number_bits(r.profit_ratio),
                number_bits(r.days_to_ship_actual),
            ],
            text: [
                r.ship_status.as_deref(),
                r.category.as_deref(),
                r.region.as_deref(),
                r.customer_name.as_deref(),
            ],
            extra: &r.extra,
        }
    }
}

/// Bit pattern for hashing; `-0.0` and `0.0` compare equal.
fn number_bits(value: Option<f64>) -> Option<u64> {
    value.map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
}

fn parse_date(value: Option<&str>, row_no: usize, column: &'static str) -> Result<NaiveDateTime> {
    value
        .and_then(DateParser::parse)
        .ok_or_else(|| InsightError::InvalidDate {
            row: row_no,
            column,
            value: value.unwrap_or_default().to_string(),
        })
}

/// Produce the canonical table from loaded rows without touching the input.
fn preprocess_table(raw: &RawTable) -> Result<(SalesTable, PreprocessStats)> {
    // 1. Dates.  Any failure aborts the whole run.
    let dated = raw
        .records
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            Ok(DatedRow {
                raw: r,
                order_date: parse_date(r.order_date.as_deref(), idx + 1, columns::ORDER_DATE)?,
                ship_date: parse_date(r.ship_date.as_deref(), idx + 1, columns::SHIP_DATE)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // 2. Duplicates, first occurrence wins.
    let mut seen: HashSet<RowKey<'_>> = HashSet::with_capacity(dated.len());
    let unique: Vec<DatedRow<'_>> = dated.into_iter().filter(|row| seen.insert(row.key())).collect();

    // 3. Fill scalar is computed once from the deduplicated Sales column.
    let forecast_filled = unique
        .iter()
        .filter(|r| r.raw.sales_forecast.is_none())
        .count();
    let forecast_fill_value = if forecast_filled > 0 {
        let fill = mean(unique.iter().filter_map(|r| r.raw.sales)).ok_or_else(|| {
            InsightError::EmptyData(
                "cannot fill SalesForecast: no Sales values are present".to_string(),
            )
        })?;
        Some(fill)
    } else {
        None
    };

    let stats = PreprocessStats {
        rows_loaded: raw.len(),
        rows_kept: unique.len(),
        duplicates_removed: raw.len() - unique.len(),
        discount_filled: unique.iter().filter(|r| r.raw.discount.is_none()).count(),
        profit_filled: unique.iter().filter(|r| r.raw.profit.is_none()).count(),
        forecast_filled,
        forecast_fill_value,
    };

    // 4. Fill and derive calendar fields.
    let records = unique
        .into_iter()
        .map(|row| {
            let r = row.raw;
            SalesRecord {
                order_id: r.order_id.clone(),
                order_date: row.order_date,
                ship_date: row.ship_date,
                sales: r.sales,
                profit: r.profit.unwrap_or(0.0),
                sales_forecast: r
                    .sales_forecast
                    .or(forecast_fill_value)
                    .unwrap_or_default(),
                discount: r.discount.unwrap_or(0.0),
                profit_ratio: r.profit_ratio,
                days_to_ship_actual: r.days_to_ship_actual,
                ship_status: r.ship_status.clone(),
                category: r.category.clone(),
                region: r.region.clone(),
                customer_name: r.customer_name.clone(),
                order_month: row.order_date.month(),
                order_year: row.order_date.year(),
                extra: r.extra.clone(),
            }
        })
        .collect();

    Ok((SalesTable::new(raw.extra_columns.clone(), records), stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

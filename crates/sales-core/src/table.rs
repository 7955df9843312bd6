//! The canonical, preprocessed sales table.

use std::io::Write;

use serde::Serialize;

use crate::dates::DateParser;
use crate::error::Result;
use crate::models::{SalesRecord, DERIVED_COLUMNS, REQUIRED_COLUMNS};

/// Ordered rows sharing the sales schema, plus any non-schema columns carried
/// through from the source.
///
/// Built once by the reader and read-only afterwards: there is no API that
/// mutates rows in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesTable {
    extra_columns: Vec<String>,
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(extra_columns: Vec<String>, records: Vec<SalesRecord>) -> Self {
        Self {
            extra_columns,
            records,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every column name in export order: schema, derived, then extras.
    pub fn column_names(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter())
            .map(|c| c.to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Write the table as CSV with a header row.
    ///
    /// Missing cells are written empty and dates use
    /// [`crate::dates::EXPORT_FORMAT`], so loading and preprocessing the output
    /// again yields an equal table.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.column_names())?;

        for record in &self.records {
            let mut row: Vec<String> = vec![
                record.order_id.clone(),
                DateParser::format(&record.order_date),
                DateParser::format(&record.ship_date),
                opt_number(record.sales),
                record.profit.to_string(),
                record.sales_forecast.to_string(),
                record.discount.to_string(),
                opt_number(record.profit_ratio),
                opt_number(record.days_to_ship_actual),
                opt_text(&record.ship_status),
                opt_text(&record.category),
                opt_text(&record.region),
                opt_text(&record.customer_name),
                record.order_month.to_string(),
                record.order_year.to_string(),
            ];
            row.extend(record.extra.iter().map(opt_text));
            out.write_record(&row)?;
        }

        out.flush()?;
        Ok(())
    }
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

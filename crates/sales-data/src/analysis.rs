//! One-shot analysis pipeline.
//!
//! Loads and preprocesses a sales CSV, returning the owned canonical table
//! together with an [`AnalysisMetadata`] record of what happened.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use sales_core::error::Result;
use sales_core::table::SalesTable;
use tracing::info;

use crate::analyzer::SalesAnalyzer;
use crate::reader::{DataReader, PreprocessStats};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// The CSV that was analysed.
    pub source: String,
    /// Number of data rows read from the source.
    pub rows_loaded: usize,
    /// Number of rows left after duplicate removal.
    pub rows_kept: usize,
    pub duplicates_removed: usize,
    pub discount_filled: usize,
    pub profit_filled: usize,
    pub forecast_filled: usize,
    /// Value written into missing `SalesForecast` cells, if any were missing.
    pub forecast_fill_value: Option<f64>,
    /// Wall-clock seconds spent reading the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent cleaning the loaded rows.
    pub preprocess_time_seconds: f64,
}

impl AnalysisMetadata {
    fn from_stats(source: &Path, stats: &PreprocessStats, load: f64, preprocess: f64) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            source: source.display().to_string(),
            rows_loaded: stats.rows_loaded,
            rows_kept: stats.rows_kept,
            duplicates_removed: stats.duplicates_removed,
            discount_filled: stats.discount_filled,
            profit_filled: stats.profit_filled,
            forecast_filled: stats.forecast_filled,
            forecast_fill_value: stats.forecast_fill_value,
            load_time_seconds: load,
            preprocess_time_seconds: preprocess,
        }
    }
}

/// The complete output of [`analyze_sales`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The canonical, preprocessed table.
    pub table: SalesTable,
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// An analyzer borrowing this result's table.
    pub fn analyzer(&self) -> SalesAnalyzer<'_> {
        SalesAnalyzer::new(&self.table)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full load and preprocess pipeline on the CSV at `path`.
///
/// Errors from either stage are returned as-is; no partial table is produced.
pub fn analyze_sales(path: impl AsRef<Path>) -> Result<AnalysisResult> {
    let path = path.as_ref();
    let mut reader = DataReader::new(path);

    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = Instant::now();
    reader.load()?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Preprocess ────────────────────────────────────────────────────
    let preprocess_start = Instant::now();
    reader.preprocess()?;
    let preprocess_time = preprocess_start.elapsed().as_secs_f64();

    // ── Step 3: Build result ──────────────────────────────────────────────────
    let stats = reader.stats().cloned().unwrap_or_default();
    let metadata = AnalysisMetadata::from_stats(path, &stats, load_time, preprocess_time);
    let table = reader.into_table()?;

    info!(
        "Analysed {}: {} rows kept of {} in {:.3}s",
        metadata.source,
        metadata.rows_kept,
        metadata.rows_loaded,
        load_time + preprocess_time,
    );

    Ok(AnalysisResult { table, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

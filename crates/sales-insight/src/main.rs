mod bootstrap;

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use sales_core::settings::Settings;
use sales_data::analysis::analyze_sales;
use sales_report::charts::{render_all, ChartOptions, JsonChartWriter};
use sales_report::report::ReportComposer;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;
    bootstrap::ensure_directories(&[settings.charts_dir.as_path(), settings.output_dir.as_path()])?;

    tracing::info!("Sales Insight v{} starting", env!("CARGO_PKG_VERSION"));

    // Load and clean the source once; everything after borrows the table.
    let analysis = analyze_sales(&settings.input)
        .with_context(|| format!("Failed to analyse {}", settings.input.display()))?;
    tracing::info!("Metadata: {}", serde_json::to_string(&analysis.metadata)?);

    if let Some(path) = &settings.export_table {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        analysis.table.write_csv(BufWriter::new(file))?;
        tracing::info!("Cleaned table exported to {}", path.display());
    }

    let analyzer = analysis.analyzer();

    let options = ChartOptions {
        top_n: settings.top_n,
        forecast_window: settings.forecast_window,
    };
    let mut writer = JsonChartWriter::new(&settings.charts_dir, options);
    let charts = render_all(&analyzer, &mut writer, &options)?;
    tracing::debug!("Chart data written to {}", writer.dir().display());
    if !charts.skipped.is_empty() {
        tracing::info!("{} charts skipped for lack of data", charts.skipped.len());
    }

    // Link whatever the renderer wrote unless told otherwise.
    let composer = match &settings.chart_extension {
        Some(extension) => {
            ReportComposer::new(&settings.charts_dir).with_chart_extension(extension.clone())
        }
        None => ReportComposer::for_renderer(&settings.charts_dir, &writer),
    };
    let report = composer.compose(&analyzer)?;
    let path = report.write_to(&settings.output_dir, settings.json_output())?;

    println!("Report generated: {}", path.display());
    Ok(())
}

//! Chart hand-off.
//!
//! Turns analyzer results into small plottable series, one per
//! [`ChartKind`], and passes them to a [`ChartRenderer`]. The built-in
//! [`JsonChartWriter`] stores each series as JSON so any plotting tool can pick
//! it up; image rendering lives outside this crate.

use std::fs;
use std::path::{Path, PathBuf};

use sales_core::error::Result;
use sales_core::models::KpiSummary;
use sales_data::analyzer::SalesAnalyzer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ── ChartKind ─────────────────────────────────────────────────────────────────

/// The fixed set of charts produced for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SalesByCategory,
    SalesByRegion,
    ProfitByCategory,
    TopCustomers,
    ShippingStatusDistribution,
    AverageShippingDays,
    ForecastVsActual,
    KpiOverview,
}

impl ChartKind {
    /// Every kind, in rendering order.
    pub const ALL: [ChartKind; 8] = [
        ChartKind::SalesByCategory,
        ChartKind::SalesByRegion,
        ChartKind::ProfitByCategory,
        ChartKind::TopCustomers,
        ChartKind::ShippingStatusDistribution,
        ChartKind::AverageShippingDays,
        ChartKind::ForecastVsActual,
        ChartKind::KpiOverview,
    ];

    /// Artifact name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::SalesByCategory => "sales_by_category",
            ChartKind::SalesByRegion => "sales_by_region",
            ChartKind::ProfitByCategory => "profit_by_category",
            ChartKind::TopCustomers => "top_customers",
            ChartKind::ShippingStatusDistribution => "shipping_status_distribution",
            ChartKind::AverageShippingDays => "average_shipping_days",
            ChartKind::ForecastVsActual => "forecast_vs_actual",
            ChartKind::KpiOverview => "kpi_overview",
        }
    }

    /// Artifact name with the given extension, e.g. `sales_by_region.png`.
    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{}", self.file_stem(), extension)
    }

    pub fn title(self, options: &ChartOptions) -> String {
        match self {
            ChartKind::SalesByCategory => "Sales by Category".to_string(),
            ChartKind::SalesByRegion => "Sales by Region".to_string(),
            ChartKind::ProfitByCategory => "Profit by Category".to_string(),
            ChartKind::TopCustomers => format!("Top {} Customers by Sales", options.top_n),
            ChartKind::ShippingStatusDistribution => "Shipping Status Distribution".to_string(),
            ChartKind::AverageShippingDays => "Average Shipping Duration".to_string(),
            ChartKind::ForecastVsActual => "Sales Forecast vs Actual".to_string(),
            ChartKind::KpiOverview => "Business KPI Overview".to_string(),
        }
    }

    /// Label of the value axis, if the chart has one.
    pub fn value_label(self) -> Option<&'static str> {
        match self {
            ChartKind::SalesByCategory | ChartKind::SalesByRegion => Some("Total Sales"),
            ChartKind::ProfitByCategory => Some("Total Profit"),
            ChartKind::TopCustomers | ChartKind::ForecastVsActual => Some("Sales"),
            ChartKind::AverageShippingDays => Some("Days"),
            ChartKind::ShippingStatusDistribution | ChartKind::KpiOverview => None,
        }
    }
}

// ── ChartOptions ──────────────────────────────────────────────────────────────

/// Tunables shared by every chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Customers shown in the top-customers ranking.
    pub top_n: usize,
    /// Leading orders plotted in the forecast-vs-actual series.
    pub forecast_window: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            forecast_window: 40,
        }
    }
}

// ── ChartData ─────────────────────────────────────────────────────────────────

/// Plottable series for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    /// One value per labelled bar.
    Bars { labels: Vec<String>, values: Vec<f64> },
    /// One count per labelled slice.
    Slices { labels: Vec<String>, counts: Vec<usize> },
    /// Actual sales (missing where a row has none) against forecast.
    Lines {
        actual: Vec<Option<f64>>,
        forecast: Vec<f64>,
    },
}

impl ChartData {
    /// Compute the series for `kind` from the analyzer.
    ///
    /// Fails with an empty-data error for the average shipping and KPI charts
    /// when there is nothing to average.
    pub fn build(kind: ChartKind, analyzer: &SalesAnalyzer<'_>, options: &ChartOptions) -> Result<Self> {
        let data = match kind {
            ChartKind::SalesByCategory => bars(analyzer.sales_by_category()),
            ChartKind::SalesByRegion => bars(analyzer.sales_by_region()),
            ChartKind::ProfitByCategory => bars(analyzer.profit_by_category()),
            ChartKind::TopCustomers => bars(analyzer.top_customers_by_sales(options.top_n)),
            ChartKind::ShippingStatusDistribution => {
                let (labels, counts) = analyzer
                    .shipping_status_distribution()
                    .into_iter()
                    .map(|s| (s.status, s.count))
                    .unzip();
                ChartData::Slices { labels, counts }
            }
            ChartKind::AverageShippingDays => ChartData::Bars {
                labels: vec!["Average Shipping Days".to_string()],
                values: vec![analyzer.average_shipping_delay()?],
            },
            ChartKind::ForecastVsActual => {
                let (actual, forecast) = analyzer
                    .forecast_accuracy()
                    .into_iter()
                    .take(options.forecast_window)
                    .map(|row| (row.sales, row.sales_forecast))
                    .unzip();
                ChartData::Lines { actual, forecast }
            }
            ChartKind::KpiOverview => {
                let kpi = analyzer.kpi_summary()?;
                ChartData::Bars {
                    labels: KpiSummary::KEYS.iter().map(|k| k.to_string()).collect(),
                    values: kpi.entries().iter().map(|(_, v)| *v).collect(),
                }
            }
        };
        Ok(data)
    }

    /// Number of points in the series.
    pub fn len(&self) -> usize {
        match self {
            ChartData::Bars { values, .. } => values.len(),
            ChartData::Slices { counts, .. } => counts.len(),
            ChartData::Lines { forecast, .. } => forecast.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn bars(groups: Vec<sales_core::models::GroupTotal>) -> ChartData {
    let (labels, values) = groups.into_iter().map(|g| (g.key, g.value)).unzip();
    ChartData::Bars { labels, values }
}

// ── ChartRenderer ─────────────────────────────────────────────────────────────

/// Something that turns chart data into an artifact on disk.
pub trait ChartRenderer {
    /// Render one chart and return the path of the artifact written.
    fn render(&mut self, kind: ChartKind, data: &ChartData) -> Result<PathBuf>;

    /// Extension of the artifacts this renderer writes, without the dot.
    fn extension(&self) -> &str;
}

/// Outcome of [`render_all`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSummary {
    pub rendered: Vec<PathBuf>,
    /// Charts left out because their data was empty.
    pub skipped: Vec<ChartKind>,
}

/// Build and render every [`ChartKind`] in order.
///
/// A chart whose data cannot be computed for lack of values is skipped with a
/// warning; any other error stops the run.
pub fn render_all<R: ChartRenderer + ?Sized>(
    analyzer: &SalesAnalyzer<'_>,
    renderer: &mut R,
    options: &ChartOptions,
) -> Result<RenderSummary> {
    let mut summary = RenderSummary::default();

    for kind in ChartKind::ALL {
        let data = match ChartData::build(kind, analyzer, options) {
            Ok(data) => data,
            Err(e) if e.is_empty_data() => {
                warn!("Skipping chart {}: {}", kind.file_stem(), e);
                summary.skipped.push(kind);
                continue;
            }
            Err(e) => return Err(e),
        };
        let path = renderer.render(kind, &data)?;
        debug!("Rendered {} ({} points) to {}", kind.file_stem(), data.len(), path.display());
        summary.rendered.push(path);
    }

    info!(
        "Rendered {} charts, skipped {}",
        summary.rendered.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

// ── JsonChartWriter ───────────────────────────────────────────────────────────

/// On-disk shape of one chart file.
#[derive(Debug, Serialize)]
struct ChartFile<'a> {
    chart: ChartKind,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_label: Option<&'static str>,
    data: &'a ChartData,
}

const JSON_EXTENSION: &str = "json";

/// Writes each chart as `<stem>.json` into a directory, creating it on first
/// use.
#[derive(Debug, Clone)]
pub struct JsonChartWriter {
    dir: PathBuf,
    options: ChartOptions,
}

impl JsonChartWriter {
    pub fn new(dir: impl Into<PathBuf>, options: ChartOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartRenderer for JsonChartWriter {
    fn render(&mut self, kind: ChartKind, data: &ChartData) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let file = ChartFile {
            chart: kind,
            title: kind.title(&self.options),
            value_label: kind.value_label(),
            data,
        };
        let path = self.dir.join(kind.file_name(self.extension()));
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        Ok(path)
    }

    fn extension(&self) -> &str {
        JSON_EXTENSION
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Business insight report.
//!
//! [`ReportComposer`] gathers the KPI summary and whichever chart artifacts
//! exist on disk into a [`Report`], which can be written as plain text or
//! JSON.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sales_core::error::Result;
use sales_core::formatting::{format_currency, format_number};
use sales_core::models::KpiSummary;
use sales_data::analyzer::SalesAnalyzer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::charts::{ChartKind, ChartRenderer};

/// File name of the written report, without extension.
pub const REPORT_STEM: &str = "Business_Insight_Report";

const TITLE: &str = "Business Performance Report";

const INTRO: &str = "This report gives a simple, visual overview of how the business is \
performing. Everything can be understood at a glance, with no technical or business \
knowledge required.";

const KPI_HEADING: &str = "Key Business Numbers";

const KPI_GUIDE: &str = "How to read this: these numbers show overall sales, profit, discounts \
and delivery performance. Higher sales and profit are good. Lower shipping days are better.";

/// Heading, narrative and charts of one report section.
struct SectionTemplate {
    heading: &'static str,
    text: &'static [&'static str],
    charts: &'static [ChartKind],
}

const SECTIONS: [SectionTemplate; 6] = [
    SectionTemplate {
        heading: "Sales Insights",
        text: &[
            "This section explains where the money is coming from and which areas perform best.",
            "Categories and regions with taller bars generate more revenue. \
             These are the strongest parts of the business.",
        ],
        charts: &[ChartKind::SalesByCategory, ChartKind::SalesByRegion],
    },
    SectionTemplate {
        heading: "Profitability Insights",
        text: &["Profit shows real earnings after costs. \
                 Some categories may sell well but earn less profit, and those need attention."],
        charts: &[ChartKind::ProfitByCategory],
    },
    SectionTemplate {
        heading: "Customer Insights",
        text: &["Top customers contribute the most to revenue. \
                 Keeping these customers happy is very important."],
        charts: &[ChartKind::TopCustomers],
    },
    SectionTemplate {
        heading: "Delivery & Shipping Insights",
        text: &["Fast and reliable delivery improves customer satisfaction. \
                 Delays can reduce repeat purchases."],
        charts: &[
            ChartKind::ShippingStatusDistribution,
            ChartKind::AverageShippingDays,
        ],
    },
    SectionTemplate {
        heading: "Sales Forecast Accuracy",
        text: &["This compares predicted sales with actual sales. \
                 Closer lines mean better planning and forecasting."],
        charts: &[ChartKind::ForecastVsActual],
    },
    SectionTemplate {
        heading: "One-Look Business Summary",
        text: &[
            "The business performance can be understood quickly using this report.",
            "Sales, profit, customers and delivery are visually explained.",
            "This report helps in making better decisions without technical knowledge.",
        ],
        charts: &[],
    },
];

// ── Report ────────────────────────────────────────────────────────────────────

/// One row of the KPI table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    pub metric: String,
    pub value: f64,
}

impl KpiRow {
    /// The value as shown in the text report; totals are money.
    pub fn display_value(&self) -> String {
        if KpiSummary::KEYS[..2].contains(&self.metric.as_str()) {
            format_currency(self.value)
        } else {
            format_number(self.value, 2)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub paragraphs: Vec<String>,
    /// Chart artifacts found on disk, in display order.
    pub charts: Vec<PathBuf>,
}

/// A composed report, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub intro: String,
    /// RFC 3339 timestamp of composition.
    pub generated_at: String,
    /// `None` when the KPIs could not be computed.
    pub kpis: Option<Vec<KpiRow>>,
    /// Guide to the KPI table, or the reason it is missing.
    pub kpi_note: String,
    pub sections: Vec<Section>,
}

impl Report {
    /// Plain-text rendering.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(self.title.len());

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}\n{}\n", self.title, rule);
        let _ = writeln!(out, "{}\n", self.intro);
        let _ = writeln!(out, "Generated: {}\n", self.generated_at);

        let _ = writeln!(out, "{}\n{}", KPI_HEADING, "-".repeat(KPI_HEADING.len()));
        if let Some(rows) = &self.kpis {
            let width = rows.iter().map(|r| r.metric.len()).max().unwrap_or(0).max("Metric".len());
            let _ = writeln!(out, "{:<width$}  {:>14}", "Metric", "Value");
            for row in rows {
                let _ = writeln!(out, "{:<width$}  {:>14}", row.metric, row.display_value());
            }
            out.push('\n');
        }
        let _ = writeln!(out, "{}\n", self.kpi_note);

        for section in &self.sections {
            let _ = writeln!(out, "{}\n{}", section.heading, "-".repeat(section.heading.len()));
            for chart in &section.charts {
                let _ = writeln!(out, "[chart] {}", chart.display());
            }
            for paragraph in &section.paragraphs {
                let _ = writeln!(out, "{}", paragraph);
            }
            out.push('\n');
        }
        out
    }

    /// Pretty-printed JSON rendering.
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report into `dir` (created if needed) and return its path.
    pub fn write_to(&self, dir: &Path, json: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let (extension, body) = if json {
            ("json", self.render_json()?)
        } else {
            ("txt", self.render_text())
        };
        let path = dir.join(format!("{REPORT_STEM}.{extension}"));
        fs::write(&path, body)?;
        info!("Report generated: {}", path.display());
        Ok(path)
    }
}

// ── ReportComposer ────────────────────────────────────────────────────────────

/// Assembles a [`Report`] from analyzer results and existing chart files.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    charts_dir: PathBuf,
    chart_extension: String,
}

impl ReportComposer {
    pub fn new(charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            charts_dir: charts_dir.into(),
            chart_extension: "png".to_string(),
        }
    }

    /// Composer that links the artifacts `renderer` writes into `charts_dir`.
    pub fn for_renderer<R: ChartRenderer + ?Sized>(
        charts_dir: impl Into<PathBuf>,
        renderer: &R,
    ) -> Self {
        Self::new(charts_dir).with_chart_extension(renderer.extension())
    }

    /// Look for chart artifacts with `extension` instead of `png`.
    pub fn with_chart_extension(mut self, extension: impl Into<String>) -> Self {
        self.chart_extension = extension.into();
        self
    }

    /// Build the report.
    ///
    /// A KPI summary that fails for lack of data leaves the table out and
    /// explains why; any other error is returned.
    pub fn compose(&self, analyzer: &SalesAnalyzer<'_>) -> Result<Report> {
        let (kpis, kpi_note) = match analyzer.kpi_summary() {
            Ok(summary) => {
                let rows = summary
                    .entries()
                    .iter()
                    .map(|(metric, value)| KpiRow {
                        metric: metric.to_string(),
                        value: *value,
                    })
                    .collect();
                (Some(rows), KPI_GUIDE.to_string())
            }
            Err(e) if e.is_empty_data() => {
                warn!("KPI table omitted: {}", e);
                (None, format!("Key business numbers are unavailable: {e}"))
            }
            Err(e) => return Err(e),
        };

        let sections = SECTIONS
            .iter()
            .map(|template| Section {
                heading: template.heading.to_string(),
                paragraphs: template.text.iter().map(|p| p.to_string()).collect(),
                charts: self.existing_charts(template.charts),
            })
            .collect();

        Ok(Report {
            title: TITLE.to_string(),
            intro: INTRO.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            kpis,
            kpi_note,
            sections,
        })
    }

    fn existing_charts(&self, kinds: &[ChartKind]) -> Vec<PathBuf> {
        kinds
            .iter()
            .map(|kind| self.charts_dir.join(kind.file_name(&self.chart_extension)))
            .filter(|path| {
                let found = path.is_file();
                if !found {
                    debug!("Chart not found, omitting: {}", path.display());
                }
                found
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Presentation layer for the sales insight pipeline.
//!
//! Builds chart series from analyzer results and composes the business
//! insight report.

pub mod charts;
pub mod report;

pub use charts::{render_all, ChartData, ChartKind, ChartOptions, ChartRenderer, JsonChartWriter};
pub use report::{Report, ReportComposer};

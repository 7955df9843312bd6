use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean a sales export and summarise it into business KPIs, chart data and a report
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-insight",
    about = "Clean a sales export and summarise it into business KPIs, chart data and a report",
    version
)]
pub struct Settings {
    /// Sales CSV to analyse
    #[arg(long, env = "SALES_INSIGHT_INPUT")]
    pub input: PathBuf,

    /// Directory that receives chart data files (and is scanned for chart images)
    #[arg(long, env = "SALES_INSIGHT_CHARTS_DIR", default_value = "./images")]
    pub charts_dir: PathBuf,

    /// Directory that receives the composed report
    #[arg(long, env = "SALES_INSIGHT_OUTPUT_DIR", default_value = "./reports")]
    pub output_dir: PathBuf,

    /// Number of customers in the top-customers ranking
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Number of orders plotted in the forecast-vs-actual series
    #[arg(long, default_value = "40")]
    pub forecast_window: usize,

    /// Report output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Extension of the chart artifacts the report links to [default: the renderer's own]
    #[arg(long)]
    pub chart_extension: Option<String>,

    /// Also write the cleaned table to this CSV path
    #[arg(long)]
    pub export_table: Option<PathBuf>,

    /// Logging level
    #[arg(long, env = "SALES_INSIGHT_LOG", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply derived overrides.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// `true` when the report should be emitted as JSON.
    pub fn json_output(&self) -> bool {
        self.format == "json"
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column names of the sales source, exactly as they appear in the header row.
pub mod columns {
    pub const ORDER_ID: &str = "OrderID";
    pub const ORDER_DATE: &str = "OrderDate";
    pub const SHIP_DATE: &str = "ShipDate";
    pub const SALES: &str = "Sales";
    pub const PROFIT: &str = "Profit";
    pub const SALES_FORECAST: &str = "SalesForecast";
    pub const DISCOUNT: &str = "Discount";
    pub const PROFIT_RATIO: &str = "ProfitRatio";
    pub const DAYS_TO_SHIP_ACTUAL: &str = "DaystoShipActual";
    pub const SHIP_STATUS: &str = "ShipStatus";
    pub const CATEGORY: &str = "Category";
    pub const REGION: &str = "Region";
    pub const CUSTOMER_NAME: &str = "CustomerName";
    pub const ORDER_MONTH: &str = "OrderMonth";
    pub const ORDER_YEAR: &str = "OrderYear";
    pub const FORECAST_ERROR: &str = "ForecastError";
}

/// Columns every source must provide, in schema order.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    columns::ORDER_ID,
    columns::ORDER_DATE,
    columns::SHIP_DATE,
    columns::SALES,
    columns::PROFIT,
    columns::SALES_FORECAST,
    columns::DISCOUNT,
    columns::PROFIT_RATIO,
    columns::DAYS_TO_SHIP_ACTUAL,
    columns::SHIP_STATUS,
    columns::CATEGORY,
    columns::REGION,
    columns::CUSTOMER_NAME,
];

/// Columns computed from `OrderDate` during preprocessing.
///
/// When present in a source they are recomputed rather than kept as extras.
pub const DERIVED_COLUMNS: [&str; 2] = [columns::ORDER_MONTH, columns::ORDER_YEAR];

// ── Raw (loaded) rows ─────────────────────────────────────────────────────────

/// One row as loaded from the source, before preprocessing.
///
/// Numbers are already parsed; dates are still text.  `None` marks a missing
/// cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub order_id: String,
    pub order_date: Option<String>,
    pub ship_date: Option<String>,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub sales_forecast: Option<f64>,
    pub discount: Option<f64>,
    pub profit_ratio: Option<f64>,
    pub days_to_ship_actual: Option<f64>,
    pub ship_status: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub customer_name: Option<String>,
    /// Cells of non-schema columns, aligned with [`RawTable::extra_columns`].
    pub extra: Vec<Option<String>>,
}

/// The loaded source: rows in file order plus the names of non-schema columns.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub extra_columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Canonical rows ────────────────────────────────────────────────────────────

/// One row of the canonical (preprocessed) table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "OrderDate")]
    pub order_date: NaiveDateTime,
    #[serde(rename = "ShipDate")]
    pub ship_date: NaiveDateTime,
    /// Never filled; `None` when the source cell was missing.
    #[serde(rename = "Sales")]
    pub sales: Option<f64>,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "SalesForecast")]
    pub sales_forecast: f64,
    #[serde(rename = "Discount")]
    pub discount: f64,
    #[serde(rename = "ProfitRatio")]
    pub profit_ratio: Option<f64>,
    #[serde(rename = "DaystoShipActual")]
    pub days_to_ship_actual: Option<f64>,
    #[serde(rename = "ShipStatus")]
    pub ship_status: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "CustomerName")]
    pub customer_name: Option<String>,
    /// Calendar month (1-12) of `order_date`.
    #[serde(rename = "OrderMonth")]
    pub order_month: u32,
    /// Calendar year of `order_date`.
    #[serde(rename = "OrderYear")]
    pub order_year: i32,
    #[serde(default)]
    pub extra: Vec<Option<String>>,
}

impl SalesRecord {
    /// Signed difference between actual and forecast sales.
    ///
    /// `None` when `sales` is missing.
    pub fn forecast_error(&self) -> Option<f64> {
        self.sales.map(|s| s - self.sales_forecast)
    }
}

// ── Query results ─────────────────────────────────────────────────────────────

/// A summed value for one group of a group-by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// Number of rows carrying one distinct `ShipStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "ShipStatus")]
    pub status: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// One row of the forecast-accuracy projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "Sales")]
    pub sales: Option<f64>,
    #[serde(rename = "SalesForecast")]
    pub sales_forecast: f64,
    #[serde(rename = "ForecastError")]
    pub forecast_error: Option<f64>,
}

/// Scalar business metrics, each rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(rename = "Total Sales")]
    pub total_sales: f64,
    #[serde(rename = "Total Profit")]
    pub total_profit: f64,
    #[serde(rename = "Avg Profit Ratio")]
    pub avg_profit_ratio: f64,
    #[serde(rename = "Avg Discount")]
    pub avg_discount: f64,
    #[serde(rename = "Avg Shipping Days")]
    pub avg_shipping_days: f64,
}

impl KpiSummary {
    /// Display keys, in their fixed order.
    pub const KEYS: [&'static str; 5] = [
        "Total Sales",
        "Total Profit",
        "Avg Profit Ratio",
        "Avg Discount",
        "Avg Shipping Days",
    ];

    /// The summary as an ordered `(key, value)` mapping.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            (Self::KEYS[0], self.total_sales),
            (Self::KEYS[1], self.total_profit),
            (Self::KEYS[2], self.avg_profit_ratio),
            (Self::KEYS[3], self.avg_discount),
            (Self::KEYS[4], self.avg_shipping_days),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Query catalog over the canonical sales table.
//!
//! Every query recomputes from the borrowed table; nothing is cached and
//! nothing is mutated.

use sales_core::error::{InsightError, Result};
use sales_core::formatting::round_to;
use sales_core::models::{ForecastRow, GroupTotal, KpiSummary, SalesRecord, StatusCount};
use sales_core::table::SalesTable;
use tracing::debug;

use crate::aggregator::{mean, SalesAggregator};

/// Decimal places applied to every KPI value.
const KPI_PLACES: u32 = 2;

// ── SalesAnalyzer ─────────────────────────────────────────────────────────────

/// Read-only analytical view of a preprocessed [`SalesTable`].
#[derive(Debug, Clone, Copy)]
pub struct SalesAnalyzer<'a> {
    table: &'a SalesTable,
}

impl<'a> SalesAnalyzer<'a> {
    pub fn new(table: &'a SalesTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SalesTable {
        self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.len()
    }

    fn records(&self) -> &'a [SalesRecord] {
        self.table.records()
    }

    // ── Totals ────────────────────────────────────────────────────────────────

    /// Sum of all present `Sales` values.
    pub fn total_sales(&self) -> f64 {
        self.records().iter().filter_map(|r| r.sales).sum()
    }

    /// Sum of `Profit` over every row.
    pub fn total_profit(&self) -> f64 {
        self.records().iter().map(|r| r.profit).sum()
    }

    // ── Groupings ─────────────────────────────────────────────────────────────

    /// Sales per category, largest first.
    pub fn sales_by_category(&self) -> Vec<GroupTotal> {
        SalesAggregator::rank_descending(SalesAggregator::sum_by(
            self.records(),
            |r| r.category.as_deref(),
            |r| r.sales,
        ))
    }

    /// Sales per region, largest first.
    pub fn sales_by_region(&self) -> Vec<GroupTotal> {
        SalesAggregator::rank_descending(SalesAggregator::sum_by(
            self.records(),
            |r| r.region.as_deref(),
            |r| r.sales,
        ))
    }

    /// Profit per category, largest first.
    pub fn profit_by_category(&self) -> Vec<GroupTotal> {
        SalesAggregator::rank_descending(SalesAggregator::sum_by(
            self.records(),
            |r| r.category.as_deref(),
            |r| Some(r.profit),
        ))
    }

    /// The `n` customers with the highest sales, largest first.
    ///
    /// Returns fewer than `n` groups when there are fewer customers.
    pub fn top_customers_by_sales(&self, n: usize) -> Vec<GroupTotal> {
        let mut ranked = SalesAggregator::rank_descending(SalesAggregator::sum_by(
            self.records(),
            |r| r.customer_name.as_deref(),
            |r| r.sales,
        ));
        ranked.truncate(n);
        ranked
    }

    /// Row count per shipping status, most frequent first.
    pub fn shipping_status_distribution(&self) -> Vec<StatusCount> {
        SalesAggregator::rank_counts(SalesAggregator::count_by(self.records(), |r| {
            r.ship_status.as_deref()
        }))
    }

    // ── Row projections ───────────────────────────────────────────────────────

    /// Orders with negative profit, in table order.
    pub fn unprofitable_orders(&self) -> Vec<&'a SalesRecord> {
        self.records().iter().filter(|r| r.profit < 0.0).collect()
    }

    /// Actual sales against forecast for every row, in table order.
    pub fn forecast_accuracy(&self) -> Vec<ForecastRow> {
        self.records()
            .iter()
            .map(|r| ForecastRow {
                order_id: r.order_id.clone(),
                sales: r.sales,
                sales_forecast: r.sales_forecast,
                forecast_error: r.forecast_error(),
            })
            .collect()
    }

    // ── Means ─────────────────────────────────────────────────────────────────

    /// Mean of the present `DaystoShipActual` values.
    ///
    /// Fails with [`InsightError::EmptyData`] when there is nothing to average.
    pub fn average_shipping_delay(&self) -> Result<f64> {
        mean(self.records().iter().filter_map(|r| r.days_to_ship_actual))
            .ok_or_else(|| InsightError::EmptyData("no shipping days to average".to_string()))
    }

    /// Headline KPIs, each rounded to two decimals.
    pub fn kpi_summary(&self) -> Result<KpiSummary> {
        let avg_shipping_days = self.average_shipping_delay()?;
        let avg_profit_ratio = mean(self.records().iter().filter_map(|r| r.profit_ratio))
            .ok_or_else(|| InsightError::EmptyData("no profit ratios to average".to_string()))?;
        let avg_discount = mean(self.records().iter().map(|r| r.discount))
            .ok_or_else(|| InsightError::EmptyData("no discounts to average".to_string()))?;

        let summary = KpiSummary {
            total_sales: round_to(self.total_sales(), KPI_PLACES),
            total_profit: round_to(self.total_profit(), KPI_PLACES),
            avg_profit_ratio: round_to(avg_profit_ratio, KPI_PLACES),
            avg_discount: round_to(avg_discount, KPI_PLACES),
            avg_shipping_days: round_to(avg_shipping_days, KPI_PLACES),
        };
        debug!(rows = self.row_count(), ?summary, "Computed KPI summary");
        Ok(summary)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_core::error::ErrorKind;

    struct Row {
        id: &'static str,
        sales: Option<f64>,
        profit: f64,
        category: Option<&'static str>,
        region: Option<&'static str>,
        customer: Option<&'static str>,
        status: Option<&'static str>,
        days: Option<f64>,
    }

    impl Row {
        fn new(id: &'static str, sales: f64, profit: f64) -> Self {
            Row {
                id,
                sales: Some(sales),
                profit,
                category: None,
                region: None,
                customer: None,
                status: None,
                days: None,
            }
        }

        fn into_record(self) -> SalesRecord {
            let date = NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            SalesRecord {
                order_id: self.id.to_string(),
                order_date: date,
                ship_date: date,
                sales: self.sales,
                profit: self.profit,
                sales_forecast: 100.0,
                discount: 0.1,
                profit_ratio: Some(0.25),
                days_to_ship_actual: self.days,
                ship_status: self.status.map(str::to_string),
                category: self.category.map(str::to_string),
                region: self.region.map(str::to_string),
                customer_name: self.customer.map(str::to_string),
                order_month: 6,
                order_year: 2024,
                extra: Vec::new(),
            }
        }
    }

    fn table_of(rows: Vec<Row>) -> SalesTable {
        SalesTable::new(Vec::new(), rows.into_iter().map(Row::into_record).collect())
    }

    fn sample_table() -> SalesTable {
        table_of(vec![
            Row {
                category: Some("Furniture"),
                region: Some("West"),
                customer: Some("Ann Lee"),
                status: Some("Shipped Late"),
                days: Some(4.0),
                ..Row::new("A-1", 100.0, -10.0)
            },
            Row {
                category: Some("Technology"),
                region: Some("East"),
                customer: Some("Bo Chan"),
                status: Some("Shipped On Time"),
                days: Some(2.0),
                ..Row::new("B-2", 200.0, 30.0)
            },
            Row {
                category: Some("Furniture"),
                region: Some("East"),
                customer: Some("Ann Lee"),
                status: Some("Shipped On Time"),
                days: Some(3.0),
                ..Row::new("C-3", 150.0, 5.0)
            },
        ])
    }

    // ── Totals ────────────────────────────────────────────────────────────────

    #[test]
    fn test_totals() {
        let table = sample_table();
        let analyzer = SalesAnalyzer::new(&table);
        assert_eq!(analyzer.total_sales(), 450.0);
        assert_eq!(analyzer.total_profit(), 25.0);
        assert_eq!(analyzer.row_count(), 3);
    }

    #[test]
    fn test_total_sales_skips_missing() {
        let table = table_of(vec![
            Row::new("A", 10.0, 0.0),
            Row {
                sales: None,
                ..Row::new("B", 0.0, 0.0)
            },
        ]);
        assert_eq!(SalesAnalyzer::new(&table).total_sales(), 10.0);
    }

    // ── Groupings ─────────────────────────────────────────────────────────────

    #[test]
    fn test_sales_by_category_sorted_descending() {
        let table = sample_table();
        let groups = SalesAnalyzer::new(&table).sales_by_category();
        assert_eq!(groups[0].key, "Furniture");
        assert_eq!(groups[0].value, 250.0);
        assert_eq!(groups[1].key, "Technology");
        assert_eq!(groups[1].value, 200.0);
    }

    #[test]
    fn test_sales_by_region() {
        let table = sample_table();
        let groups = SalesAnalyzer::new(&table).sales_by_region();
        assert_eq!(groups[0].key, "East");
        assert_eq!(groups[0].value, 350.0);
        assert_eq!(groups[1].key, "West");
    }

    #[test]
    fn test_profit_by_category_can_be_negative() {
        let table = table_of(vec![
            Row {
                category: Some("Furniture"),
                ..Row::new("A", 10.0, -40.0)
            },
            Row {
                category: Some("Office"),
                ..Row::new("B", 10.0, 5.0)
            },
        ]);
        let groups = SalesAnalyzer::new(&table).profit_by_category();
        assert_eq!(groups[0].key, "Office");
        assert_eq!(groups[1].key, "Furniture");
        assert_eq!(groups[1].value, -40.0);
    }

    #[test]
    fn test_group_ties_keep_first_seen_order() {
        let table = table_of(vec![
            Row {
                region: Some("South"),
                ..Row::new("A", 50.0, 0.0)
            },
            Row {
                region: Some("North"),
                ..Row::new("B", 50.0, 0.0)
            },
            Row {
                region: Some("Central"),
                ..Row::new("C", 75.0, 0.0)
            },
        ]);
        let keys: Vec<String> = SalesAnalyzer::new(&table)
            .sales_by_region()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["Central", "South", "North"]);
    }

    #[test]
    fn test_rows_without_key_are_excluded() {
        let table = table_of(vec![
            Row::new("A", 999.0, 0.0),
            Row {
                category: Some("Office"),
                ..Row::new("B", 1.0, 0.0)
            },
        ]);
        let groups = SalesAnalyzer::new(&table).sales_by_category();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, 1.0);
    }

    #[test]
    fn test_top_customers() {
        let table = sample_table();
        let analyzer = SalesAnalyzer::new(&table);

        let top = analyzer.top_customers_by_sales(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "Ann Lee");
        assert_eq!(top[0].value, 250.0);

        assert_eq!(analyzer.top_customers_by_sales(10).len(), 2);
        assert!(analyzer.top_customers_by_sales(0).is_empty());
    }

    #[test]
    fn test_shipping_status_distribution() {
        let table = sample_table();
        let dist = SalesAnalyzer::new(&table).shipping_status_distribution();
        assert_eq!(
            dist,
            vec![
                StatusCount {
                    status: "Shipped On Time".to_string(),
                    count: 2
                },
                StatusCount {
                    status: "Shipped Late".to_string(),
                    count: 1
                },
            ]
        );
    }

    // ── Row projections ───────────────────────────────────────────────────────

    #[test]
    fn test_unprofitable_orders() {
        let table = sample_table();
        let losses = SalesAnalyzer::new(&table).unprofitable_orders();
        assert_eq!(losses.len(), 1);
        assert_eq!(losses[0].order_id, "A-1");
    }

    #[test]
    fn test_zero_profit_is_not_unprofitable() {
        let table = table_of(vec![Row::new("A", 1.0, 0.0)]);
        assert!(SalesAnalyzer::new(&table).unprofitable_orders().is_empty());
    }

    #[test]
    fn test_forecast_accuracy() {
        let table = sample_table();
        let rows = SalesAnalyzer::new(&table).forecast_accuracy();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].order_id, "A-1");
        assert_eq!(rows[0].forecast_error, Some(0.0));
        assert_eq!(rows[1].forecast_error, Some(100.0));
        assert_eq!(rows[2].forecast_error, Some(50.0));
    }

    // ── Means and KPIs ────────────────────────────────────────────────────────

    #[test]
    fn test_average_shipping_delay() {
        let table = sample_table();
        assert_eq!(SalesAnalyzer::new(&table).average_shipping_delay().unwrap(), 3.0);
    }

    #[test]
    fn test_average_shipping_delay_single_row() {
        let table = table_of(vec![Row {
            days: Some(6.5),
            ..Row::new("A", 1.0, 0.0)
        }]);
        assert_eq!(SalesAnalyzer::new(&table).average_shipping_delay().unwrap(), 6.5);
    }

    #[test]
    fn test_kpi_summary() {
        let table = sample_table();
        let kpi = SalesAnalyzer::new(&table).kpi_summary().unwrap();
        assert_eq!(kpi.total_sales, 450.0);
        assert_eq!(kpi.total_profit, 25.0);
        assert_eq!(kpi.avg_profit_ratio, 0.25);
        assert_eq!(kpi.avg_discount, 0.1);
        assert_eq!(kpi.avg_shipping_days, 3.0);
    }

    #[test]
    fn test_kpi_summary_rounds_half_away_from_zero() {
        let table = table_of(vec![
            Row {
                days: Some(1.0),
                ..Row::new("A", 0.125, 0.0)
            },
            Row {
                days: Some(2.0),
                ..Row::new("B", 0.0, 0.0)
            },
            Row {
                days: Some(2.0),
                ..Row::new("C", 0.0, 0.0)
            },
        ]);
        let kpi = SalesAnalyzer::new(&table).kpi_summary().unwrap();
        assert_eq!(kpi.total_sales, 0.13);
        assert_eq!(kpi.avg_shipping_days, 1.67);
    }

    // ── Empty table ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_table() {
        let table = SalesTable::default();
        let analyzer = SalesAnalyzer::new(&table);
        assert_eq!(analyzer.total_sales(), 0.0);
        assert_eq!(analyzer.total_profit(), 0.0);
        assert!(analyzer.sales_by_category().is_empty());
        assert!(analyzer.sales_by_region().is_empty());
        assert!(analyzer.profit_by_category().is_empty());
        assert!(analyzer.top_customers_by_sales(5).is_empty());
        assert!(analyzer.shipping_status_distribution().is_empty());
        assert!(analyzer.unprofitable_orders().is_empty());
        assert!(analyzer.forecast_accuracy().is_empty());

        let err = analyzer.average_shipping_delay().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyData);
        let err = analyzer.kpi_summary().unwrap_err();
        assert!(err.is_empty_data());
    }
}

//! Property tests for the reader and analyzer.
//!
//! Rows are generated as CSV text and pushed through the real loader so every
//! property also exercises parsing, filling and duplicate removal.

use proptest::prelude::*;
use sales_data::analyzer::SalesAnalyzer;
use sales_data::core::SalesTable;
use sales_data::reader::DataReader;

const HEADER: &str = "OrderID,OrderDate,ShipDate,Sales,Profit,SalesForecast,Discount,ProfitRatio,DaystoShipActual,ShipStatus,Category,Region,CustomerName";

const CATEGORIES: [&str; 3] = ["Furniture", "Office Supplies", "Technology"];
const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const CUSTOMERS: [&str; 5] = ["Ann Lee", "Bo Chan", "Cy Diaz", "Di Eke", "Ed Fox"];
const STATUSES: [&str; 3] = ["Shipped On Time", "Shipped Late", "Shipped Early"];

// ============================================================================
// Generators
// ============================================================================

#[derive(Debug, Clone)]
struct GenRow {
    day: u32,
    ship_after: u32,
    sales: i32,
    profit: Option<i32>,
    forecast: Option<i32>,
    discount: Option<u8>,
    days: Option<u8>,
    category: usize,
    region: usize,
    customer: usize,
    status: usize,
}

fn gen_row() -> impl Strategy<Value = GenRow> {
    (
        (1u32..=28, 0u32..10, 0i32..5_000),
        (
            prop::option::of(-500i32..500),
            prop::option::of(0i32..5_000),
            prop::option::of(0u8..=80),
            prop::option::of(0u8..15),
        ),
        (0..CATEGORIES.len(), 0..REGIONS.len(), 0..CUSTOMERS.len(), 0..STATUSES.len()),
    )
        .prop_map(
            |((day, ship_after, sales), (profit, forecast, discount, days), (category, region, customer, status))| GenRow {
                day,
                ship_after,
                sales,
                profit,
                forecast,
                discount,
                days,
                category,
                region,
                customer,
                status,
            },
        )
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// CSV text with one row per generated row; order ids are unique.
fn csv_of(rows: &[GenRow]) -> String {
    let mut text = format!("{HEADER}\n");
    for (idx, r) in rows.iter().enumerate() {
        text.push_str(&format!(
            "ORD-{idx},2024-03-{:02},2024-04-{:02},{},{},{},{},{},{},{},{},{},{}\n",
            r.day,
            r.ship_after + 1,
            r.sales,
            cell(r.profit),
            cell(r.forecast),
            cell(r.discount.map(|d| f64::from(d) / 100.0)),
            cell(r.profit.map(|p| f64::from(p) / 1_000.0)),
            cell(r.days),
            STATUSES[r.status],
            CATEGORIES[r.category],
            REGIONS[r.region],
            CUSTOMERS[r.customer],
        ));
    }
    text
}

fn preprocess(text: &str) -> SalesTable {
    let mut reader = DataReader::default();
    reader.load_from_reader(text.as_bytes()).unwrap();
    reader.preprocess().unwrap();
    reader.into_table().unwrap()
}

fn is_non_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] >= w[1])
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn totals_match_column_sums(rows in prop::collection::vec(gen_row(), 1..40)) {
        let table = preprocess(&csv_of(&rows));
        let analyzer = SalesAnalyzer::new(&table);

        let sales: f64 = rows.iter().map(|r| f64::from(r.sales)).sum();
        let profit: f64 = rows.iter().filter_map(|r| r.profit).map(f64::from).sum();
        prop_assert_eq!(analyzer.total_sales(), sales);
        prop_assert_eq!(analyzer.total_profit(), profit);
    }

    #[test]
    fn groupings_are_sorted_and_sum_to_total(rows in prop::collection::vec(gen_row(), 1..40)) {
        let table = preprocess(&csv_of(&rows));
        let analyzer = SalesAnalyzer::new(&table);
        let total = analyzer.total_sales();

        for groups in [analyzer.sales_by_category(), analyzer.sales_by_region()] {
            let values: Vec<f64> = groups.iter().map(|g| g.value).collect();
            prop_assert!(is_non_increasing(&values));
            prop_assert_eq!(values.iter().sum::<f64>(), total);
        }
    }

    #[test]
    fn unprofitable_orders_partition_the_table(rows in prop::collection::vec(gen_row(), 0..40)) {
        let table = preprocess(&csv_of(&rows));
        let analyzer = SalesAnalyzer::new(&table);
        let losses = analyzer.unprofitable_orders();

        prop_assert!(losses.iter().all(|r| r.profit < 0.0));
        let expected: Vec<&str> = table
            .records()
            .iter()
            .filter(|r| r.profit < 0.0)
            .map(|r| r.order_id.as_str())
            .collect();
        let actual: Vec<&str> = losses.iter().map(|r| r.order_id.as_str()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(
            table.records().iter().filter(|r| r.profit >= 0.0).count(),
            table.len() - losses.len()
        );
    }

    #[test]
    fn top_customers_is_prefix_of_ranking(
        rows in prop::collection::vec(gen_row(), 0..40),
        n in 0usize..8,
    ) {
        let table = preprocess(&csv_of(&rows));
        let analyzer = SalesAnalyzer::new(&table);
        let full = analyzer.top_customers_by_sales(usize::MAX);
        let top = analyzer.top_customers_by_sales(n);

        prop_assert!(top.len() <= n);
        prop_assert_eq!(top.len(), n.min(full.len()));
        prop_assert_eq!(&top[..], &full[..top.len()]);
        let values: Vec<f64> = top.iter().map(|g| g.value).collect();
        prop_assert!(is_non_increasing(&values));
    }

    #[test]
    fn forecast_rows_cover_every_record(rows in prop::collection::vec(gen_row(), 0..40)) {
        let table = preprocess(&csv_of(&rows));
        let forecast = SalesAnalyzer::new(&table).forecast_accuracy();

        prop_assert_eq!(forecast.len(), table.len());
        for (row, record) in forecast.iter().zip(table.records()) {
            prop_assert_eq!(&row.order_id, &record.order_id);
            prop_assert_eq!(row.forecast_error, record.sales.map(|s| s - record.sales_forecast));
        }
    }

    #[test]
    fn export_then_reload_is_a_fixed_point(rows in prop::collection::vec(gen_row(), 0..30)) {
        let table = preprocess(&csv_of(&rows));

        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let reloaded = preprocess(&String::from_utf8(buf).unwrap());

        prop_assert_eq!(reloaded, table);
    }

    #[test]
    fn single_row_shipping_mean_is_exact(row in gen_row(), days in 0u8..30) {
        let one = GenRow { days: Some(days), ..row };
        let table = preprocess(&csv_of(&[one]));
        let delay = SalesAnalyzer::new(&table).average_shipping_delay().unwrap();
        prop_assert_eq!(delay, f64::from(days));
    }
}

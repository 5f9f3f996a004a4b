//! Summary report builder over pre-aggregated NYC taxi analytics views.
//!
//! The upstream pipeline materializes a handful of summary views
//! (daily revenue, payment mix, zone leaderboards, ...); this crate loads
//! them in full, derives headline scalars and ranked sub-tables, and hands a
//! read-only [`ReportContext`] snapshot to whatever layer renders it.

pub mod analyzer;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod table;
pub mod views;

pub use analyzer::{build_page, outlier_sample, Page, PageReport, ReportOptions, ZoneRanking};
pub use config::DataSourceConfig;
pub use context::{AggregateResult, AggregateSpec, ReportContext};
pub use db::{SqliteTableLoader, TableLoader};
pub use error::ReportError;
pub use table::{Column, NamedTable, SortOrder, Value};
pub use views::SummaryView;

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use rusqlite::Connection;

    use crate::analyzer::{build_page, outlier_sample, Page, PageReport, ReportOptions};
    use crate::context::{AggregateSpec, ReportContext};
    use crate::db::SqliteTableLoader;
    use crate::error::ReportError;
    use crate::table::{SortOrder, Value};

    /// In-memory data source shaped like the warehouse output for one month.
    fn fixture_source() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE daily_revenue (
                trip_date TEXT, trips INTEGER, total_revenue REAL,
                avg_fare REAL, avg_distance REAL, avg_tip_pct REAL
            );
            INSERT INTO daily_revenue VALUES
                ('2024-12-25', 500, 25000.0, 50.0, 4.1, 19.0),
                ('2024-12-28', 650, 15500.0, 23.8, 2.4, 16.5),
                ('2024-12-31', 800, 18000.0, 22.5, 2.0, 15.0);

            CREATE TABLE payment_summary (payment_type TEXT, revenue REAL);
            INSERT INTO payment_summary VALUES
                ('Credit card', 46800.0),
                ('Cash', 9360.0),
                ('Dispute', 2340.0);

            CREATE TABLE passenger_summary (passenger_count INTEGER, trips INTEGER);
            INSERT INTO passenger_summary VALUES (1, 1200), (2, 450), (4, 300);

            CREATE TABLE pickup_summary (
                pickup_zone TEXT, trips INTEGER, revenue REAL, avg_fare REAL
            );
            INSERT INTO pickup_summary VALUES
                ('JFK Airport', 420, 31500.0, 75.0),
                ('Midtown Center', 610, 9150.0, 15.0),
                ('Upper East Side', 380, 5700.0, 15.0);

            CREATE TABLE dropoff_summary (
                dropoff_zone TEXT, trips INTEGER, revenue REAL, avg_fare REAL
            );
            INSERT INTO dropoff_summary VALUES
                ('Midtown Center', 700, 10500.0, 15.0),
                ('LGA Airport', 520, 28600.0, 55.0);

            CREATE TABLE hourly_trends (hour_of_day INTEGER, trips INTEGER);
            INSERT INTO hourly_trends VALUES
                (8, 310), (12, 280), (18, 640), (22, 450), (3, 90);

            CREATE TABLE trip_length_summary (trip_bucket TEXT, trips INTEGER);
            INSERT INTO trip_length_summary VALUES
                ('Short (<2mi)', 900),
                ('Medium (2-10mi)', 780),
                ('Long (10-30mi)', 230),
                ('Very Long (>30mi)', 40);
        ",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_e2e_build_and_overview() {
        let loader = SqliteTableLoader::from_connection(fixture_source());
        let ctx = ReportContext::build_standard(&loader).unwrap();

        let overview = match build_page(&ctx, Page::Overview, &ReportOptions::default()).unwrap()
        {
            PageReport::Overview(r) => r,
            other => panic!("wrong page payload: {:?}", other),
        };

        assert_eq!(overview.total_revenue, 58500.0);
        assert_eq!(overview.total_trips, 1950);

        // Volume vs. value: the busiest day and the top-earning day differ.
        let highlights = overview.highlights.unwrap();
        assert_eq!(highlights.peak_revenue_date, "2024-12-25");
        assert_eq!(highlights.peak_trips_date, "2024-12-31");
        assert_eq!(highlights.peak_hour, Some(18));
        assert_eq!(highlights.top_pickup_zone.as_deref(), Some("Midtown Center"));

        let top_payment = overview.top_payment.unwrap();
        assert_eq!(top_payment.payment_type, "Credit card");
        assert_eq!(top_payment.share_pct, 80.0);
    }

    #[test]
    fn test_e2e_null_cells_do_not_fail_the_report() {
        let conn = fixture_source();
        conn.execute_batch(
            "UPDATE daily_revenue SET avg_tip_pct = NULL WHERE trip_date = '2024-12-28';",
        )
        .unwrap();
        let loader = SqliteTableLoader::from_connection(conn);
        let ctx = ReportContext::build_standard(&loader).unwrap();

        let overview = match build_page(&ctx, Page::Overview, &ReportOptions::default()).unwrap()
        {
            PageReport::Overview(r) => r,
            other => panic!("wrong page payload: {:?}", other),
        };

        // The NULL day drops out of the average instead of poisoning it.
        assert_eq!(overview.avg_tip_pct, 17.0);
        assert_eq!(overview.total_revenue, 58500.0);
    }

    #[test]
    fn test_e2e_every_page_builds_and_serializes() {
        let loader = SqliteTableLoader::from_connection(fixture_source());
        let ctx = ReportContext::build_standard(&loader).unwrap();

        for page in [
            Page::Overview,
            Page::DailyTrends,
            Page::PerformanceInsights,
            Page::CustomerBehavior,
            Page::Geography,
        ] {
            let payload = build_page(&ctx, page, &ReportOptions::default()).unwrap();
            let json = serde_json::to_string(&payload).unwrap();
            assert!(json.contains("\"page\""), "payload should be tagged: {}", json);
        }
    }

    #[test]
    fn test_e2e_rebuild_is_identical() {
        let loader = SqliteTableLoader::from_connection(fixture_source());
        let first = ReportContext::build_standard(&loader).unwrap();
        let second = ReportContext::build_standard(&loader).unwrap();

        for name in ["daily_revenue", "payment_summary", "hourly_trends"] {
            assert_eq!(first.table(name).unwrap(), second.table(name).unwrap());
        }

        let spec = AggregateSpec::TopN {
            table: "pickup_summary".into(),
            column: "trips".into(),
            n: 2,
            order: SortOrder::Descending,
        };
        assert_eq!(
            first.aggregate(&spec).unwrap(),
            second.aggregate(&spec).unwrap()
        );
    }

    #[test]
    fn test_e2e_missing_view_fails_fast() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE daily_revenue (
                trip_date TEXT, trips INTEGER, total_revenue REAL,
                avg_fare REAL, avg_distance REAL, avg_tip_pct REAL
            );",
        )
        .unwrap();
        let loader = SqliteTableLoader::from_connection(conn);

        let err = ReportContext::build_standard(&loader).unwrap_err();
        assert!(matches!(err, ReportError::TableNotFound(_)));
    }

    #[test]
    fn test_e2e_contract_violation_is_column_not_found() {
        let conn = fixture_source();
        conn.execute_batch(
            "
            DROP TABLE hourly_trends;
            CREATE TABLE hourly_trends (hour_of_day INTEGER); -- trips missing
        ",
        )
        .unwrap();
        let loader = SqliteTableLoader::from_connection(conn);

        let err = ReportContext::build_standard(&loader).unwrap_err();
        assert!(matches!(
            err,
            ReportError::ColumnNotFound { ref table, ref column }
                if table == "hourly_trends" && column == "trips"
        ));
    }

    #[test]
    fn test_e2e_outliers_optional_then_present() {
        let conn = fixture_source();
        let loader = SqliteTableLoader::from_connection(conn);
        assert!(outlier_sample(&loader).unwrap().is_none());

        let conn = fixture_source();
        conn.execute_batch(
            "CREATE TABLE outliers (trip_id INTEGER, fare REAL, note TEXT);
             INSERT INTO outliers VALUES (1, 812.5, 'fare above p99.9');",
        )
        .unwrap();
        let loader = SqliteTableLoader::from_connection(conn);
        let sample = outlier_sample(&loader).unwrap().unwrap();
        assert_eq!(sample.row_count(), 1);
        assert_eq!(sample.value(0, "fare").unwrap(), &Value::Float(812.5));
    }
}

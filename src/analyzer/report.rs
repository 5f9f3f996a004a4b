//! Typed page payloads assembled from a `ReportContext`. Page selection and
//! rendering belong to the presentation layer; this module only computes the
//! numbers each page displays.

use serde::Serialize;

use crate::analyzer::aggregate;
use crate::context::{AggregateResult, AggregateSpec, ReportContext};
use crate::db::TableLoader;
use crate::error::ReportError;
use crate::table::{NamedTable, SortOrder, Value};
use crate::views::{SummaryView, OUTLIER_DISPLAY_CAP};

/// The five report pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    Overview,
    DailyTrends,
    PerformanceInsights,
    CustomerBehavior,
    Geography,
}

/// Ranking key for the pickup/dropoff zone leaderboards. The source variants
/// disagreed on this, so it is an explicit choice rather than a hard-coded
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneRanking {
    ByTrips,
    ByRevenue,
}

impl ZoneRanking {
    fn sort_column(&self) -> &'static str {
        match self {
            ZoneRanking::ByTrips => "trips",
            ZoneRanking::ByRevenue => "revenue",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Row cap for the Performance Insights zone leaderboards.
    pub zone_top_n: usize,
    pub zone_ranking: ZoneRanking,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            zone_top_n: 10,
            zone_ranking: ZoneRanking::ByTrips,
        }
    }
}

const TOP_DAYS: usize = 5;
const TOP_HOURS: usize = 8;
const GEOGRAPHY_TOP_ZONES: usize = 10;

// ─── Page payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum PageReport {
    Overview(OverviewReport),
    DailyTrends(DailyTrendsReport),
    PerformanceInsights(PerformanceInsightsReport),
    CustomerBehavior(CustomerBehaviorReport),
    Geography(GeographyReport),
}

/// KPI cards plus the highlight block of the executive overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub total_revenue: f64,
    pub total_trips: i64,
    pub avg_fare: f64,
    pub avg_distance: f64,
    pub avg_tip_pct: f64,
    pub top_payment: Option<PaymentHighlight>,
    pub highlights: Option<OverviewHighlights>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHighlight {
    pub payment_type: String,
    pub share_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewHighlights {
    pub peak_revenue_date: String,
    pub peak_revenue: f64,
    pub peak_trips_date: String,
    pub peak_trips: i64,
    pub peak_hour: Option<i64>,
    pub top_pickup_zone: Option<String>,
    pub top_dropoff_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrendsReport {
    /// `daily_revenue` ordered by `trip_date` ascending.
    pub days: NamedTable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsightsReport {
    pub top_days_by_revenue: NamedTable,
    pub top_days_by_trips: NamedTable,
    pub peak_hours: NamedTable,
    pub top_pickup_zones: NamedTable,
    pub top_dropoff_zones: NamedTable,
    /// `daily_revenue` ordered by date with a derived `revenue_per_trip`
    /// column; zero-trip days fall back to 0.0.
    pub revenue_per_trip: NamedTable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBehaviorReport {
    pub payment_share: NamedTable,
    pub trips_by_passenger_count: NamedTable,
    pub trip_length_distribution: NamedTable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographyReport {
    pub top_pickup_zones: NamedTable,
    pub top_dropoff_zones: NamedTable,
}

// ─── Builders ────────────────────────────────────────────────────────────────

/// Assembles one page payload from the context.
pub fn build_page(
    ctx: &ReportContext,
    page: Page,
    options: &ReportOptions,
) -> Result<PageReport, ReportError> {
    Ok(match page {
        Page::Overview => PageReport::Overview(build_overview(ctx)?),
        Page::DailyTrends => PageReport::DailyTrends(build_daily_trends(ctx)?),
        Page::PerformanceInsights => {
            PageReport::PerformanceInsights(build_performance_insights(ctx, options)?)
        }
        Page::CustomerBehavior => PageReport::CustomerBehavior(build_customer_behavior(ctx)?),
        Page::Geography => PageReport::Geography(build_geography(ctx, options)?),
    })
}

fn build_overview(ctx: &ReportContext) -> Result<OverviewReport, ReportError> {
    let daily = SummaryView::DailyRevenue.name();

    let total_revenue = scalar(ctx, sum_spec(daily, "total_revenue"))?;
    let total_trips = scalar(ctx, sum_spec(daily, "trips"))? as i64;
    let avg_fare = scalar(ctx, mean_spec(daily, "avg_fare"))?;
    let avg_distance = scalar(ctx, mean_spec(daily, "avg_distance"))?;
    let avg_tip_pct = scalar(ctx, mean_spec(daily, "avg_tip_pct"))?;

    let top_payment = build_top_payment(ctx)?;
    let highlights = build_highlights(ctx)?;

    Ok(OverviewReport {
        total_revenue,
        total_trips,
        avg_fare,
        avg_distance,
        avg_tip_pct,
        top_payment,
        highlights,
    })
}

fn build_top_payment(ctx: &ReportContext) -> Result<Option<PaymentHighlight>, ReportError> {
    let shares = table(
        ctx,
        AggregateSpec::PercentageShare {
            table: SummaryView::PaymentSummary.name().to_string(),
            value_column: "revenue".to_string(),
            group_column: "payment_type".to_string(),
        },
    )?;
    let ranked = aggregate::top_n(&shares, "share_pct", 1, SortOrder::Descending)?;
    if ranked.is_empty() {
        return Ok(None);
    }
    Ok(Some(PaymentHighlight {
        payment_type: ranked.value(0, "payment_type")?.label(),
        share_pct: ranked.value(0, "share_pct")?.as_f64().unwrap_or(0.0),
    }))
}

fn build_highlights(ctx: &ReportContext) -> Result<Option<OverviewHighlights>, ReportError> {
    let daily = SummaryView::DailyRevenue.name();
    if ctx.table(daily)?.is_empty() {
        return Ok(None);
    }

    let peak_revenue_day = table(ctx, top_spec(daily, "total_revenue", 1))?;
    let peak_trips_day = table(ctx, top_spec(daily, "trips", 1))?;
    let peak_hour = table(
        ctx,
        top_spec(SummaryView::HourlyTrends.name(), "trips", 1),
    )?;
    let top_pickup = table(
        ctx,
        top_spec(SummaryView::PickupSummary.name(), "trips", 1),
    )?;
    let top_dropoff = table(
        ctx,
        top_spec(SummaryView::DropoffSummary.name(), "trips", 1),
    )?;

    Ok(Some(OverviewHighlights {
        peak_revenue_date: peak_revenue_day.value(0, "trip_date")?.label(),
        peak_revenue: peak_revenue_day
            .value(0, "total_revenue")?
            .as_f64()
            .unwrap_or(0.0),
        peak_trips_date: peak_trips_day.value(0, "trip_date")?.label(),
        peak_trips: peak_trips_day.value(0, "trips")?.as_f64().unwrap_or(0.0) as i64,
        peak_hour: first_i64(&peak_hour, "hour_of_day"),
        top_pickup_zone: first_label(&top_pickup, "pickup_zone"),
        top_dropoff_zone: first_label(&top_dropoff, "dropoff_zone"),
    }))
}

fn build_daily_trends(ctx: &ReportContext) -> Result<DailyTrendsReport, ReportError> {
    Ok(DailyTrendsReport {
        days: by_date_ascending(ctx)?,
    })
}

fn build_performance_insights(
    ctx: &ReportContext,
    options: &ReportOptions,
) -> Result<PerformanceInsightsReport, ReportError> {
    let daily = SummaryView::DailyRevenue.name();
    let zone_key = options.zone_ranking.sort_column();

    let revenue_per_trip = aggregate::derive_ratio(
        &by_date_ascending(ctx)?,
        "revenue_per_trip",
        "total_revenue",
        "trips",
        Some(0.0),
    )?;

    Ok(PerformanceInsightsReport {
        top_days_by_revenue: table(ctx, top_spec(daily, "total_revenue", TOP_DAYS))?,
        top_days_by_trips: table(ctx, top_spec(daily, "trips", TOP_DAYS))?,
        peak_hours: table(
            ctx,
            top_spec(SummaryView::HourlyTrends.name(), "trips", TOP_HOURS),
        )?,
        top_pickup_zones: table(
            ctx,
            top_spec(SummaryView::PickupSummary.name(), zone_key, options.zone_top_n),
        )?,
        top_dropoff_zones: table(
            ctx,
            top_spec(SummaryView::DropoffSummary.name(), zone_key, options.zone_top_n),
        )?,
        revenue_per_trip,
    })
}

fn build_customer_behavior(ctx: &ReportContext) -> Result<CustomerBehaviorReport, ReportError> {
    let passengers = ctx.table(SummaryView::PassengerSummary.name())?;
    let buckets = ctx.table(SummaryView::TripLengthSummary.name())?;

    Ok(CustomerBehaviorReport {
        payment_share: table(
            ctx,
            AggregateSpec::PercentageShare {
                table: SummaryView::PaymentSummary.name().to_string(),
                value_column: "revenue".to_string(),
                group_column: "payment_type".to_string(),
            },
        )?,
        trips_by_passenger_count: aggregate::top_n(
            passengers,
            "passenger_count",
            passengers.row_count(),
            SortOrder::Ascending,
        )?,
        trip_length_distribution: aggregate::top_n(
            buckets,
            "trips",
            buckets.row_count(),
            SortOrder::Descending,
        )?,
    })
}

fn build_geography(
    ctx: &ReportContext,
    options: &ReportOptions,
) -> Result<GeographyReport, ReportError> {
    let zone_key = options.zone_ranking.sort_column();
    Ok(GeographyReport {
        top_pickup_zones: table(
            ctx,
            top_spec(
                SummaryView::PickupSummary.name(),
                zone_key,
                GEOGRAPHY_TOP_ZONES,
            ),
        )?,
        top_dropoff_zones: table(
            ctx,
            top_spec(
                SummaryView::DropoffSummary.name(),
                zone_key,
                GEOGRAPHY_TOP_ZONES,
            ),
        )?,
    })
}

/// The optional `outliers` view, consumed unmodified and capped for display.
/// Absence of the view is not an error.
pub fn outlier_sample(loader: &dyn TableLoader) -> Result<Option<NamedTable>, ReportError> {
    match loader.load(SummaryView::Outliers.name()) {
        Ok(t) => Ok(Some(t.truncated(OUTLIER_DISPLAY_CAP))),
        Err(ReportError::TableNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

// ─── Spec helpers ────────────────────────────────────────────────────────────

fn sum_spec(table: &str, column: &str) -> AggregateSpec {
    AggregateSpec::Sum {
        table: table.to_string(),
        column: column.to_string(),
    }
}

fn mean_spec(table: &str, column: &str) -> AggregateSpec {
    AggregateSpec::Mean {
        table: table.to_string(),
        column: column.to_string(),
    }
}

fn top_spec(table: &str, column: &str, n: usize) -> AggregateSpec {
    AggregateSpec::TopN {
        table: table.to_string(),
        column: column.to_string(),
        n,
        order: SortOrder::Descending,
    }
}

fn scalar(ctx: &ReportContext, spec: AggregateSpec) -> Result<f64, ReportError> {
    match ctx.aggregate(&spec)? {
        AggregateResult::Scalar(v) => Ok(v),
        AggregateResult::Table(_) => unreachable!("scalar spec produced a table"),
    }
}

fn table(ctx: &ReportContext, spec: AggregateSpec) -> Result<NamedTable, ReportError> {
    match ctx.aggregate(&spec)? {
        AggregateResult::Table(t) => Ok(t),
        AggregateResult::Scalar(_) => unreachable!("table spec produced a scalar"),
    }
}

fn by_date_ascending(ctx: &ReportContext) -> Result<NamedTable, ReportError> {
    let daily = ctx.table(SummaryView::DailyRevenue.name())?;
    aggregate::top_n(daily, "trip_date", daily.row_count(), SortOrder::Ascending)
}

fn first_label(table: &NamedTable, column: &str) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    table.value(0, column).ok().map(Value::label)
}

fn first_i64(table: &NamedTable, column: &str) -> Option<i64> {
    if table.is_empty() {
        return None;
    }
    table.value(0, column).ok().and_then(Value::as_i64)
}

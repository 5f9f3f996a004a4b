/// Catalog of the summary views the report is built from. Each view is
/// produced by an external pipeline and queried read-only; the required
/// columns are the minimal contract the aggregate layer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryView {
    DailyRevenue,
    PaymentSummary,
    PassengerSummary,
    PickupSummary,
    DropoffSummary,
    HourlyTrends,
    TripLengthSummary,
    Outliers,
}

/// Rows of the optional `outliers` view shown to the presentation layer.
pub const OUTLIER_DISPLAY_CAP: usize = 50;

impl SummaryView {
    pub const ALL: [SummaryView; 8] = [
        SummaryView::DailyRevenue,
        SummaryView::PaymentSummary,
        SummaryView::PassengerSummary,
        SummaryView::PickupSummary,
        SummaryView::DropoffSummary,
        SummaryView::HourlyTrends,
        SummaryView::TripLengthSummary,
        SummaryView::Outliers,
    ];

    /// The seven views every report build requires. `outliers` is optional
    /// and excluded here.
    pub fn standard() -> Vec<SummaryView> {
        Self::ALL
            .iter()
            .copied()
            .filter(|v| !v.is_optional())
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SummaryView::DailyRevenue => "daily_revenue",
            SummaryView::PaymentSummary => "payment_summary",
            SummaryView::PassengerSummary => "passenger_summary",
            SummaryView::PickupSummary => "pickup_summary",
            SummaryView::DropoffSummary => "dropoff_summary",
            SummaryView::HourlyTrends => "hourly_trends",
            SummaryView::TripLengthSummary => "trip_length_summary",
            SummaryView::Outliers => "outliers",
        }
    }

    pub fn from_name(name: &str) -> Option<SummaryView> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }

    /// Columns the aggregate layer reads from this view. The `outliers`
    /// view is consumed unmodified and has no contract.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SummaryView::DailyRevenue => &[
                "trip_date",
                "trips",
                "total_revenue",
                "avg_fare",
                "avg_distance",
                "avg_tip_pct",
            ],
            SummaryView::PaymentSummary => &["payment_type", "revenue"],
            SummaryView::PassengerSummary => &["passenger_count", "trips"],
            SummaryView::PickupSummary => &["pickup_zone", "trips", "revenue", "avg_fare"],
            SummaryView::DropoffSummary => &["dropoff_zone", "trips", "revenue", "avg_fare"],
            SummaryView::HourlyTrends => &["hour_of_day", "trips"],
            SummaryView::TripLengthSummary => &["trip_bucket", "trips"],
            SummaryView::Outliers => &[],
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SummaryView::Outliers)
    }
}

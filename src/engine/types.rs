// Result record types
// JSON-serializable rows returned by the query functions

use serde::Serialize;

/// A column name/type pair from dataset introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// Basic information about the trip dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataInfo {
    pub row_count: i64,
    pub columns: Vec<ColumnInfo>,
    pub source: String,
}

/// Summary statistics over the whole dataset.
///
/// Averages are `None` when the dataset is empty (SQL NULL), never NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_trips: i64,
    pub avg_fare: Option<f64>,
    pub avg_distance: Option<f64>,
}

/// Trip count for one zone, joined to its name and borough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneTripCount {
    pub location_id: i64,
    pub zone_name: String,
    pub borough: String,
    pub trip_count: i64,
}

/// Trip count for one hour of the day (0-23).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyCount {
    pub hour: i64,
    pub trip_count: i64,
}

/// Trip count for one day of the week (0 = Sunday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub day_of_week: i64,
    pub day_name: String,
    pub trip_count: i64,
}

/// Trip count for one payment-type code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCount {
    pub payment_type: i64,
    pub payment_name: &'static str,
    pub trip_count: i64,
}

/// Trip count for one (day-of-week, hour) cell of the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub day_of_week: i64,
    pub hour: i64,
    pub trip_count: i64,
}

/// Tip aggregates over credit-card trips with a positive fare.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipStats {
    pub trip_count: i64,
    pub avg_tip: Option<f64>,
    pub avg_tip_percent: Option<f64>,
}

/// Tip aggregates folded into one borough through the zone lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughTipStats {
    pub borough: String,
    pub trip_count: i64,
    pub avg_tip_percent: f64,
}

/// Pickup count for one location id, annotated from the zone lookup.
///
/// `zone_name` and `borough` are `None` when the id has no lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonePickupCount {
    pub location_id: i64,
    pub zone_name: Option<String>,
    pub borough: Option<String>,
    pub trip_count: i64,
}

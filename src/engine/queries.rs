// Query functions module
// One fixed, hand-written aggregation per endpoint

use std::cmp::Ordering;
use std::collections::HashMap;

use super::errors::EngineError;
use super::rows::round2;
use super::types::{
    BoroughTipStats, ColumnInfo, DailyCount, DataInfo, DatasetStats, HeatmapCell, HourlyCount,
    PaymentCount, TipStats, ZonePickupCount, ZoneTripCount,
};
use super::Engine;

/// Credit card payment-type code in the TLC data dictionary.
const CREDIT_CARD: i64 = 1;

/// Map a TLC payment-type code to its label.
pub const fn payment_label(code: i64) -> &'static str {
    match code {
        1 => "Credit card",
        2 => "Cash",
        3 => "No charge",
        4 => "Dispute",
        5 => "Unknown",
        6 => "Voided trip",
        _ => "Other",
    }
}

impl Engine {
    /// Row count, column names/types, and the configured source location.
    pub fn data_info(&self) -> Result<DataInfo, EngineError> {
        let conn = self.conn()?;

        let row_count = conn.query_row(
            &format!("SELECT COUNT(*) FROM '{}'", self.trips_source),
            [],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "DESCRIBE SELECT * FROM '{}'",
            self.trips_source
        ))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    column_type: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DataInfo {
            row_count,
            columns,
            source: self.trips_path.clone(),
        })
    }

    /// Summary statistics. The distance average is guarded against the
    /// zero/negative placeholder values present in the raw data.
    pub fn stats(&self) -> Result<DatasetStats, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT \
                 COUNT(*) AS total_trips, \
                 AVG(total_amount) AS avg_fare, \
                 AVG(CASE WHEN trip_distance > 0 THEN trip_distance END) AS avg_distance \
             FROM '{}'",
            self.trips_source
        );
        conn.query_row(&sql, [], |row| {
            Ok(DatasetStats {
                total_trips: row.get(0)?,
                avg_fare: row.get::<_, Option<f64>>(1)?.map(round2),
                avg_distance: row.get::<_, Option<f64>>(2)?.map(round2),
            })
        })
        .map_err(EngineError::from)
    }

    /// Top pickup zones by trip count.
    pub fn top_pickup_zones(&self, limit: u32) -> Result<Vec<ZoneTripCount>, EngineError> {
        self.top_zones("PULocationID", limit)
    }

    /// Top dropoff zones by trip count.
    pub fn top_dropoff_zones(&self, limit: u32) -> Result<Vec<ZoneTripCount>, EngineError> {
        self.top_zones("DOLocationID", limit)
    }

    // Ties are broken by ascending location id so repeated calls against the
    // same static dataset return the same ordering.
    fn top_zones(&self, column: &str, limit: u32) -> Result<Vec<ZoneTripCount>, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT t.{column} AS location_id, z.Zone, z.Borough, COUNT(*) AS trip_count \
             FROM '{trips}' t \
             JOIN '{zones}' z ON t.{column} = z.LocationID \
             GROUP BY location_id, z.Zone, z.Borough \
             ORDER BY trip_count DESC, location_id \
             LIMIT {limit}",
            trips = self.trips_source,
            zones = self.zones_source,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ZoneTripCount {
                location_id: row.get(0)?,
                zone_name: row.get(1)?,
                borough: row.get(2)?,
                trip_count: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }

    /// Trip counts grouped by hour of day of the pickup timestamp.
    pub fn hourly_trips(&self) -> Result<Vec<HourlyCount>, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT hour(tpep_pickup_datetime) AS hour, COUNT(*) AS trip_count \
             FROM '{}' GROUP BY hour ORDER BY hour",
            self.trips_source
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(HourlyCount {
                hour: row.get(0)?,
                trip_count: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }

    /// Trip counts grouped by day of week (0 = Sunday).
    pub fn daily_trips(&self) -> Result<Vec<DailyCount>, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT \
                 dayofweek(tpep_pickup_datetime) AS day_of_week, \
                 dayname(tpep_pickup_datetime) AS day_name, \
                 COUNT(*) AS trip_count \
             FROM '{}' GROUP BY day_of_week, day_name ORDER BY day_of_week",
            self.trips_source
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyCount {
                day_of_week: row.get(0)?,
                day_name: row.get(1)?,
                trip_count: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }

    /// Trip counts grouped by payment-type code, descending.
    pub fn payment_breakdown(&self) -> Result<Vec<PaymentCount>, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT payment_type, COUNT(*) AS trip_count \
             FROM '{}' GROUP BY payment_type ORDER BY trip_count DESC, payment_type",
            self.trips_source
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let payment_type: i64 = row.get(0)?;
            Ok(PaymentCount {
                payment_type,
                payment_name: payment_label(payment_type),
                trip_count: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }

    /// Trip counts grouped by (day of week, hour) for heatmap display.
    pub fn heatmap(&self) -> Result<Vec<HeatmapCell>, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT \
                 dayofweek(tpep_pickup_datetime) AS day_of_week, \
                 hour(tpep_pickup_datetime) AS hour, \
                 COUNT(*) AS trip_count \
             FROM '{}' GROUP BY day_of_week, hour ORDER BY day_of_week, hour",
            self.trips_source
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(HeatmapCell {
                day_of_week: row.get(0)?,
                hour: row.get(1)?,
                trip_count: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }

    /// Tip aggregates over credit-card trips. Zero-fare rows are excluded so
    /// the percentage is never a division by zero.
    pub fn tip_stats(&self) -> Result<TipStats, EngineError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT \
                 COUNT(*) AS trip_count, \
                 AVG(tip_amount) AS avg_tip, \
                 AVG(tip_amount / fare_amount * 100) AS avg_tip_percent \
             FROM '{}' WHERE payment_type = {CREDIT_CARD} AND fare_amount > 0",
            self.trips_source
        );
        conn.query_row(&sql, [], |row| {
            Ok(TipStats {
                trip_count: row.get(0)?,
                avg_tip: row.get::<_, Option<f64>>(1)?.map(round2),
                avg_tip_percent: row.get::<_, Option<f64>>(2)?.map(round2),
            })
        })
        .map_err(EngineError::from)
    }

    /// Tip percentage by borough: the SQL side groups by pickup location, and
    /// the per-location averages are folded into boroughs through the zone
    /// cache with a count-weighted mean. Locations absent from the lookup
    /// fold into "Unknown".
    #[allow(clippy::cast_precision_loss)]
    pub fn tip_by_borough(&self) -> Result<Vec<BoroughTipStats>, EngineError> {
        // Collect before touching the zone cache: both paths lock the
        // connection, and the mutex is not reentrant.
        let per_location: Vec<(i64, i64, f64)> = {
            let conn = self.conn()?;
            let sql = format!(
                "SELECT \
                     PULocationID AS location_id, \
                     COUNT(*) AS trip_count, \
                     AVG(tip_amount / fare_amount * 100) AS avg_tip_percent \
                 FROM '{}' WHERE payment_type = {CREDIT_CARD} AND fare_amount > 0 \
                 GROUP BY location_id",
                self.trips_source
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let lookup = self.zone_lookup()?;
        let mut grouped: HashMap<&str, (i64, f64)> = HashMap::new();
        for (location_id, trip_count, avg_tip_percent) in &per_location {
            let borough = lookup
                .get(location_id)
                .map_or("Unknown", |zone| zone.borough.as_str());
            let entry = grouped.entry(borough).or_insert((0, 0.0));
            entry.0 += trip_count;
            entry.1 += avg_tip_percent * *trip_count as f64;
        }

        let mut result: Vec<BoroughTipStats> = grouped
            .into_iter()
            .map(|(borough, (trip_count, weighted_sum))| BoroughTipStats {
                borough: borough.to_string(),
                trip_count,
                avg_tip_percent: round2(weighted_sum / trip_count as f64),
            })
            .collect();
        result.sort_by(|a, b| {
            b.avg_tip_percent
                .partial_cmp(&a.avg_tip_percent)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.borough.cmp(&b.borough))
        });
        Ok(result)
    }

    /// Pickup counts for every distinct location id, annotated with zone and
    /// borough names from the cache. Ids missing from the lookup keep their
    /// counts with null names.
    pub fn zone_pickups(&self) -> Result<Vec<ZonePickupCount>, EngineError> {
        let counts: Vec<(i64, i64)> = {
            let conn = self.conn()?;
            let sql = format!(
                "SELECT PULocationID AS location_id, COUNT(*) AS trip_count \
                 FROM '{}' GROUP BY location_id ORDER BY location_id",
                self.trips_source
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut result = Vec::with_capacity(counts.len());
        for (location_id, trip_count) in counts {
            let zone = self.zone(location_id)?;
            result.push(ZonePickupCount {
                location_id,
                zone_name: zone.map(|z| z.zone.clone()),
                borough: zone.map(|z| z.borough.clone()),
                trip_count,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_engine;
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_data_info_counts_and_columns() {
        let (_dir, engine) = sample_engine();
        let info = engine.data_info().unwrap();
        assert_eq!(info.row_count, 10);
        assert!(info.columns.iter().any(|c| c.name == "tpep_pickup_datetime"));
        assert!(info.columns.iter().all(|c| !c.column_type.is_empty()));
        assert!(info.source.ends_with("trips.csv"));
    }

    #[test]
    fn test_stats_totals_and_guarded_averages() {
        let (_dir, engine) = sample_engine();
        let stats = engine.stats().unwrap();
        let info = engine.data_info().unwrap();

        assert_eq!(stats.total_trips, info.row_count);
        assert_close(stats.avg_fare.unwrap(), 12.47);
        // Two zero-distance rows are excluded: (2+4+1+3+5+2.5+1.5+6)/8
        assert_close(stats.avg_distance.unwrap(), 3.13);
    }

    #[test]
    fn test_top_pickup_zones_limit_and_tie_break() {
        let (_dir, engine) = sample_engine();

        // All three known zones have 3 pickups each; ties break on location id
        let top = engine.top_pickup_zones(10).unwrap();
        assert_eq!(top.len(), 3); // location 9 has no lookup row and drops out
        assert_eq!(
            top.iter().map(|z| z.location_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(top.iter().all(|z| z.trip_count == 3));
        assert_eq!(top[0].zone_name, "Midtown Center");
        assert_eq!(top[2].borough, "Brooklyn");

        let limited = engine.top_pickup_zones(2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].location_id, 1);

        // Stable across repeated calls against the same static dataset
        assert_eq!(top, engine.top_pickup_zones(10).unwrap());
    }

    #[test]
    fn test_top_zones_cover_joined_dataset() {
        let (_dir, engine) = sample_engine();
        let top = engine.top_pickup_zones(3).unwrap();
        let total: i64 = top.iter().map(|z| z.trip_count).sum();
        // 9 of 10 trips have a pickup zone in the lookup
        assert_eq!(total, 9);
    }

    #[test]
    fn test_top_dropoff_zones() {
        let (_dir, engine) = sample_engine();
        let top = engine.top_dropoff_zones(10).unwrap();
        assert_eq!(
            top.iter().map(|z| z.location_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(top.iter().all(|z| z.trip_count == 3));
    }

    #[test]
    fn test_hourly_trips_partition_dataset() {
        let (_dir, engine) = sample_engine();
        let hourly = engine.hourly_trips().unwrap();

        let total: i64 = hourly.iter().map(|h| h.trip_count).sum();
        assert_eq!(total, 10);

        let hours: Vec<i64> = hourly.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![8, 9, 11, 18, 23]);
        assert!(hourly.iter().all(|h| (0..24).contains(&h.hour)));
        assert_eq!(hourly[0].trip_count, 3);
    }

    #[test]
    fn test_daily_trips_partition_dataset() {
        let (_dir, engine) = sample_engine();
        let daily = engine.daily_trips().unwrap();

        let total: i64 = daily.iter().map(|d| d.trip_count).sum();
        assert_eq!(total, 10);

        // 2024-01-01 is a Monday; dayofweek counts Sunday as 0
        let monday = daily.iter().find(|d| d.day_of_week == 1).unwrap();
        assert_eq!(monday.day_name, "Monday");
        assert_eq!(monday.trip_count, 4);

        let sunday = daily.iter().find(|d| d.day_of_week == 0).unwrap();
        assert_eq!(sunday.day_name, "Sunday");
        assert_eq!(sunday.trip_count, 1);
    }

    #[test]
    fn test_payment_breakdown() {
        let (_dir, engine) = sample_engine();
        let breakdown = engine.payment_breakdown().unwrap();

        let total: i64 = breakdown.iter().map(|p| p.trip_count).sum();
        assert_eq!(total, 10);

        assert_eq!(breakdown[0].payment_type, 1);
        assert_eq!(breakdown[0].payment_name, "Credit card");
        assert_eq!(breakdown[0].trip_count, 7);
        assert_eq!(breakdown[1].payment_name, "Cash");
        assert_eq!(breakdown[1].trip_count, 2);
        assert_eq!(breakdown[2].payment_name, "Dispute");
        assert_eq!(breakdown[2].trip_count, 1);
    }

    #[test]
    fn test_payment_label() {
        assert_eq!(payment_label(1), "Credit card");
        assert_eq!(payment_label(6), "Voided trip");
        assert_eq!(payment_label(0), "Other");
        assert_eq!(payment_label(99), "Other");
    }

    #[test]
    fn test_heatmap_partitions_dataset() {
        let (_dir, engine) = sample_engine();
        let cells = engine.heatmap().unwrap();

        let total: i64 = cells.iter().map(|c| c.trip_count).sum();
        assert_eq!(total, 10);

        // Monday 08:00 bucket holds three trips
        let cell = cells
            .iter()
            .find(|c| c.day_of_week == 1 && c.hour == 8)
            .unwrap();
        assert_eq!(cell.trip_count, 3);
    }

    #[test]
    fn test_tip_stats_filters_payment_and_fare() {
        let (_dir, engine) = sample_engine();
        let tips = engine.tip_stats().unwrap();

        // Seven credit-card trips, one with a zero fare excluded
        assert_eq!(tips.trip_count, 6);
        assert_close(tips.avg_tip.unwrap(), 2.12);
        // (20 + 25 + 10 + 20 + 10 + 10) / 6
        assert_close(tips.avg_tip_percent.unwrap(), 15.83);
    }

    #[test]
    fn test_tip_by_borough_folds_through_zone_cache() {
        let (_dir, engine) = sample_engine();
        let by_borough = engine.tip_by_borough().unwrap();

        assert_eq!(by_borough.len(), 3);
        assert_eq!(by_borough[0].borough, "Brooklyn");
        assert_close(by_borough[0].avg_tip_percent, 20.0);
        assert_eq!(by_borough[0].trip_count, 1);

        assert_eq!(by_borough[1].borough, "Manhattan");
        assert_close(by_borough[1].avg_tip_percent, 16.25);
        assert_eq!(by_borough[1].trip_count, 4);

        // Location 9 has no lookup entry and folds into "Unknown"
        assert_eq!(by_borough[2].borough, "Unknown");
        assert_close(by_borough[2].avg_tip_percent, 10.0);
        assert_eq!(by_borough[2].trip_count, 1);
    }

    #[test]
    fn test_zone_pickups_keeps_unmatched_locations() {
        let (_dir, engine) = sample_engine();
        let pickups = engine.zone_pickups().unwrap();

        assert_eq!(
            pickups.iter().map(|p| p.location_id).collect::<Vec<_>>(),
            vec![1, 2, 3, 9]
        );
        let total: i64 = pickups.iter().map(|p| p.trip_count).sum();
        assert_eq!(total, 10);

        let known = &pickups[0];
        assert_eq!(known.zone_name.as_deref(), Some("Midtown Center"));
        assert_eq!(known.borough.as_deref(), Some("Manhattan"));

        let unmatched = &pickups[3];
        assert_eq!(unmatched.trip_count, 1);
        assert!(unmatched.zone_name.is_none());
        assert!(unmatched.borough.is_none());
    }
}

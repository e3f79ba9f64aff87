// Engine module entry
// Owns the embedded analytical connection and the zone lookup cache

mod errors;
mod queries;
mod rows;
mod types;
mod zones;

pub use errors::EngineError;
pub use types::{
    BoroughTipStats, ColumnInfo, DailyCount, DataInfo, DatasetStats, HeatmapCell, HourlyCount,
    PaymentCount, TipStats, ZonePickupCount, ZoneTripCount,
};
pub use zones::ZoneInfo;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

use duckdb::Connection;
use serde_json::Value;

use crate::config::DataConfig;

/// Shared handle to the embedded analytical query engine.
///
/// Holds one in-memory connection behind a mutex; every query function locks
/// it for the duration of a single statement. The dataset itself is read
/// directly from the configured trip and zone files, which may be local paths
/// or remote URLs - the engine reads both uniformly.
pub struct Engine {
    conn: Mutex<Connection>,
    zones: OnceLock<HashMap<i64, ZoneInfo>>,
    /// Trip data path as reported to callers.
    trips_path: String,
    /// Trip data path with single quotes escaped for embedding in SQL.
    trips_source: String,
    zones_source: String,
}

impl Engine {
    /// Create the engine connection. Initialization failure is fatal and
    /// surfaces as a startup error.
    pub fn open(data: &DataConfig) -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            zones: OnceLock::new(),
            trips_path: data.trips_path.clone(),
            trips_source: escape_source(&data.trips_path),
            zones_source: escape_source(&data.zones_path),
        })
    }

    /// Eagerly populate the zone lookup cache. Returns the number of zones.
    pub fn warm(&self) -> Result<usize, EngineError> {
        Ok(self.zone_lookup()?.len())
    }

    /// The zone lookup map, loaded on first call and cached for the process
    /// lifetime. A concurrent first call may load twice; the losing result is
    /// discarded, and both reads are identical.
    pub fn zone_lookup(&self) -> Result<&HashMap<i64, ZoneInfo>, EngineError> {
        if let Some(lookup) = self.zones.get() {
            return Ok(lookup);
        }
        let conn = self.conn()?;
        let loaded = zones::load(&conn, &self.zones_source)?;
        drop(conn);
        Ok(self.zones.get_or_init(|| loaded))
    }

    /// Map a location id to its zone record. Ids absent from the lookup
    /// return `None`, never an error.
    pub fn zone(&self, location_id: i64) -> Result<Option<&ZoneInfo>, EngineError> {
        Ok(self.zone_lookup()?.get(&location_id))
    }

    /// Execute an arbitrary statement verbatim against the dataset and return
    /// rows as column-keyed JSON objects.
    ///
    /// Accepts trusted input only: there is no validation or query-shape
    /// restriction, so this must not be reachable from untrusted callers. It
    /// is deliberately not routed over HTTP.
    #[allow(dead_code)]
    pub fn raw_query(&self, sql: &str) -> Result<Vec<Value>, EngineError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        rows::rows_to_json(&mut stmt)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, EngineError> {
        self.conn.lock().map_err(|_| EngineError::Poisoned)
    }
}

/// Escape a data source path for embedding in a single-quoted SQL literal.
fn escape_source(path: &str) -> String {
    path.replace('\'', "''")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ZONES_CSV: &str = "\
LocationID,Borough,Zone,service_zone
1,Manhattan,Midtown Center,Yellow Zone
2,Manhattan,Times Sq,Yellow Zone
3,Brooklyn,Williamsburg,Boro Zone
";

    // Ten trips across five days; location id 9 has no zone lookup entry.
    const TRIPS_CSV: &str = "\
tpep_pickup_datetime,tpep_dropoff_datetime,PULocationID,DOLocationID,trip_distance,fare_amount,tip_amount,total_amount,payment_type
2024-01-01 08:10:00,2024-01-01 08:25:00,1,2,2.0,10.0,2.0,12.0,1
2024-01-01 08:40:00,2024-01-01 08:50:00,1,3,0.0,8.0,0.0,8.0,2
2024-01-01 09:15:00,2024-01-01 09:45:00,2,1,4.0,20.0,5.0,25.0,1
2024-01-02 18:30:00,2024-01-02 18:40:00,1,2,1.0,6.0,0.6,6.6,1
2024-01-02 18:45:00,2024-01-02 19:10:00,3,1,3.0,15.0,3.0,18.0,1
2024-01-03 23:05:00,2024-01-03 23:40:00,3,2,5.0,25.0,0.0,25.0,2
2024-01-06 11:00:00,2024-01-06 11:20:00,9,1,2.5,12.0,1.2,13.2,1
2024-01-07 11:30:00,2024-01-07 11:40:00,2,9,1.5,7.0,0.0,7.0,4
2024-01-01 08:55:00,2024-01-01 09:05:00,2,3,0.0,9.0,0.9,9.9,1
2024-01-03 23:55:00,2024-01-04 00:30:00,3,3,6.0,0.0,0.0,0.0,1
";

    /// Build an engine over a small CSV fixture. The returned `TempDir` must
    /// stay alive for as long as the engine is used.
    pub(crate) fn sample_engine() -> (TempDir, Engine) {
        let dir = TempDir::new().expect("create tempdir");
        let trips = dir.path().join("trips.csv");
        let zones = dir.path().join("zones.csv");
        fs::write(&trips, TRIPS_CSV).expect("write trips fixture");
        fs::write(&zones, ZONES_CSV).expect("write zones fixture");

        let data = DataConfig {
            trips_path: trips.to_string_lossy().into_owned(),
            zones_path: zones.to_string_lossy().into_owned(),
        };
        let engine = Engine::open(&data).expect("open engine");
        (dir, engine)
    }

    #[test]
    fn test_zone_lookup_known_ids() {
        let (_dir, engine) = sample_engine();
        let zone = engine.zone(1).unwrap().expect("zone 1 present");
        assert_eq!(zone.borough, "Manhattan");
        assert_eq!(zone.zone, "Midtown Center");
        assert_eq!(zone.service_zone, "Yellow Zone");

        // Repeated lookups return identical, stable records
        let again = engine.zone(1).unwrap().expect("zone 1 present");
        assert_eq!(zone, again);
    }

    #[test]
    fn test_zone_lookup_missing_id_is_none() {
        let (_dir, engine) = sample_engine();
        assert!(engine.zone(9).unwrap().is_none());
        assert!(engine.zone(999).unwrap().is_none());
    }

    #[test]
    fn test_zone_cache_loaded_once() {
        let (_dir, engine) = sample_engine();
        let first = engine.zone_lookup().unwrap();
        let second = engine.zone_lookup().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_warm_populates_cache() {
        let (_dir, engine) = sample_engine();
        assert_eq!(engine.warm().unwrap(), 3);
        assert!(engine.zones.get().is_some());
    }

    #[test]
    fn test_raw_query_returns_column_keyed_records() {
        let (_dir, engine) = sample_engine();
        let records = engine
            .raw_query("SELECT 42 AS answer, 'hello' AS greeting")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["answer"], 42);
        assert_eq!(records[0]["greeting"], "hello");
    }

    #[test]
    fn test_raw_query_rejects_malformed_sql() {
        let (_dir, engine) = sample_engine();
        assert!(engine.raw_query("SELEC oops").is_err());
    }

    #[test]
    fn test_escape_source() {
        assert_eq!(escape_source("data/trips.parquet"), "data/trips.parquet");
        assert_eq!(escape_source("it's.csv"), "it''s.csv");
    }
}

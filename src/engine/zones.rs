// Zone lookup module
// Loads the taxi zone table into an in-memory map keyed by location id

use std::collections::HashMap;

use duckdb::Connection;
use serde::Serialize;

use super::errors::EngineError;

/// Geographic classification attached to a numeric location id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneInfo {
    pub borough: String,
    pub zone: String,
    pub service_zone: String,
}

/// Load the entire zone lookup table in one query.
///
/// The table is small (a few hundred rows), so a full scan into a map gives
/// O(1) point lookups for the lifetime of the process.
pub(super) fn load(
    conn: &Connection,
    zones_source: &str,
) -> Result<HashMap<i64, ZoneInfo>, EngineError> {
    let sql = format!("SELECT LocationID, Borough, Zone, service_zone FROM '{zones_source}'");
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            ZoneInfo {
                borough: row.get(1)?,
                zone: row.get(2)?,
                service_zone: row.get(3)?,
            },
        ))
    })?;

    let mut lookup = HashMap::new();
    for entry in rows {
        let (location_id, info) = entry?;
        lookup.insert(location_id, info);
    }
    Ok(lookup)
}

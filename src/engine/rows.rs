// Row conversion module
// Generic conversion from engine result rows to JSON values

use chrono::DateTime;
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Statement;
use serde_json::{Map, Value};

use super::errors::EngineError;

/// Round a currency or ratio figure to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Execute a prepared statement and convert every result row into a JSON
/// object keyed by column name.
pub(super) fn rows_to_json(stmt: &mut Statement) -> Result<Vec<Value>, EngineError> {
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        let stmt = row.as_ref();
        let mut record = Map::new();
        for idx in 0..stmt.column_count() {
            let name = stmt.column_name(idx)?.to_string();
            record.insert(name, value_to_json(row.get_ref(idx)?));
        }
        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Map a single engine value to a JSON scalar.
///
/// Timestamps and dates are rendered as strings; engine types with no natural
/// JSON scalar degrade to their debug rendering instead of erroring.
fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::from(i),
        ValueRef::SmallInt(i) => Value::from(i),
        ValueRef::Int(i) => Value::from(i),
        ValueRef::BigInt(i) => Value::from(i),
        ValueRef::HugeInt(i) => {
            i64::try_from(i).map_or_else(|_| Value::String(i.to_string()), Value::from)
        }
        ValueRef::UTinyInt(i) => Value::from(i),
        ValueRef::USmallInt(i) => Value::from(i),
        ValueRef::UInt(i) => Value::from(i),
        ValueRef::UBigInt(i) => Value::from(i),
        ValueRef::Float(f) => Value::from(f),
        ValueRef::Double(f) => Value::from(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map_or(Value::Null, Value::from),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        ValueRef::Timestamp(unit, raw) => timestamp_to_json(unit, raw),
        ValueRef::Date32(days) => DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string())),
        other => Value::String(format!("{other:?}")),
    }
}

fn timestamp_to_json(unit: TimeUnit, raw: i64) -> Value {
    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    DateTime::from_timestamp_micros(micros).map_or(Value::Null, |ts| {
        Value::String(ts.format("%Y-%m-%d %H:%M:%S").to_string())
    })
}

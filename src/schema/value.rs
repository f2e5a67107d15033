//! Value semantics per field kind: zero values, coercion of request values, timestamp text form.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::schema::{ColumnInfo, FieldKind};

/// Text form of the zero timestamp (0001-01-01T00:00:00Z).
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|ts| ts.with_timezone(&Utc))
}

pub fn now() -> Value {
    Value::String(format_timestamp(Utc::now()))
}

/// The value a column takes when a request does not supply one.
pub fn zero_value(column: &ColumnInfo) -> Value {
    if column.nullable {
        return Value::Null;
    }
    match column.kind {
        FieldKind::Text => Value::String(String::new()),
        FieldKind::Bool => Value::Bool(false),
        FieldKind::UInt => Value::from(0u64),
        FieldKind::Timestamp => Value::String(ZERO_TIMESTAMP.to_string()),
    }
}

/// True when `value` is absent, null, or the kind's zero value.
pub fn is_blank(kind: FieldKind, value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) if kind == FieldKind::Text => s.is_empty(),
        Some(Value::Number(n)) if kind == FieldKind::UInt => n.as_u64() == Some(0),
        _ => false,
    }
}

/// Largest unsigned value a BIGINT column holds.
pub const MAX_UINT: u64 = i64::MAX as u64;

/// Check and normalize a request value for `column`. Null on a non-nullable column yields the zero value.
pub fn coerce(column: &ColumnInfo, value: &Value) -> Result<Value, AppError> {
    if value.is_null() {
        return Ok(zero_value(column));
    }
    let invalid = || AppError::InvalidInput(format!("{} must be {}", column.name, column.kind.describe()));
    match column.kind {
        FieldKind::Text => value.as_str().map(|s| Value::String(s.to_string())).ok_or_else(invalid),
        FieldKind::Bool => value.as_bool().map(Value::Bool).ok_or_else(invalid),
        FieldKind::UInt => value
            .as_u64()
            .filter(|n| *n <= MAX_UINT)
            .map(Value::from)
            .ok_or_else(invalid),
        FieldKind::Timestamp => value
            .as_str()
            .and_then(parse_timestamp)
            .map(|ts| Value::String(format_timestamp(ts)))
            .ok_or_else(invalid),
    }
}

//! Typed bind values: convert record values by column kind and bind them to sqlx queries.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::error::AppError;
use crate::schema::value::parse_timestamp;
use crate::schema::{ColumnInfo, FieldKind};

/// A value bound to a PostgreSQL query. Nulls keep their kind so the parameter is typed.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null(FieldKind),
    Text(String),
    Bool(bool),
    BigInt(i64),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    pub fn from_json(column: &ColumnInfo, v: Option<&Value>) -> Result<Self, AppError> {
        let v = match v {
            None | Some(Value::Null) => return Ok(SqlValue::Null(column.kind)),
            Some(v) => v,
        };
        let invalid = || AppError::InvalidInput(format!("{} must be {}", column.name, column.kind.describe()));
        Ok(match column.kind {
            FieldKind::Text => SqlValue::Text(v.as_str().ok_or_else(invalid)?.to_string()),
            FieldKind::Bool => SqlValue::Bool(v.as_bool().ok_or_else(invalid)?),
            FieldKind::UInt => SqlValue::BigInt(v.as_i64().filter(|n| *n >= 0).ok_or_else(invalid)?),
            FieldKind::Timestamp => SqlValue::Timestamp(v.as_str().and_then(parse_timestamp).ok_or_else(invalid)?),
        })
    }
}

pub fn bind<'q>(query: Query<'q, Postgres, PgArguments>, value: &SqlValue) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null(FieldKind::Text) => query.bind(None::<String>),
        SqlValue::Null(FieldKind::Bool) => query.bind(None::<bool>),
        SqlValue::Null(FieldKind::UInt) => query.bind(None::<i64>),
        SqlValue::Null(FieldKind::Timestamp) => query.bind(None::<DateTime<Utc>>),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::BigInt(n) => query.bind(*n),
        SqlValue::Timestamp(ts) => query.bind(*ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnRole, ValidationRule};
    use chrono::TimeZone;
    use serde_json::json;

    fn column(kind: FieldKind) -> ColumnInfo {
        ColumnInfo {
            name: "f",
            kind,
            nullable: true,
            hidden: false,
            role: ColumnRole::Field,
            rule: ValidationRule::default(),
            pattern: None,
        }
    }

    #[test]
    fn converts_by_kind() {
        assert_eq!(SqlValue::from_json(&column(FieldKind::Text), Some(&json!("a"))).unwrap(), SqlValue::Text("a".into()));
        assert_eq!(SqlValue::from_json(&column(FieldKind::UInt), Some(&json!(7))).unwrap(), SqlValue::BigInt(7));
        assert_eq!(
            SqlValue::from_json(&column(FieldKind::Timestamp), Some(&json!("2030-01-01T00:00:00Z"))).unwrap(),
            SqlValue::Timestamp(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(SqlValue::from_json(&column(FieldKind::Bool), None).unwrap(), SqlValue::Null(FieldKind::Bool));
    }

    #[test]
    fn rejects_mismatched_values() {
        assert!(SqlValue::from_json(&column(FieldKind::Bool), Some(&json!(1))).is_err());
        assert!(SqlValue::from_json(&column(FieldKind::UInt), Some(&json!(-3))).is_err());
    }
}

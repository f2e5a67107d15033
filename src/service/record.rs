//! Turning request bodies into records and records into response payloads.

use serde_json::Value;

use crate::error::AppError;
use crate::repository::Record;
use crate::schema::value::{coerce, zero_value};
use crate::schema::{ColumnInfo, ResolvedEntity};

pub fn into_record(body: Value) -> Result<Record, AppError> {
    match body {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::InvalidInput("request body must be a JSON object".into())),
    }
}

fn value_or_zero(col: &ColumnInfo, body: &Record) -> Result<Value, AppError> {
    match body.get(col.name) {
        Some(v) => coerce(col, v),
        None => Ok(zero_value(col)),
    }
}

/// Values for a new row: every input column, omitted ones at their zero value.
pub fn build_insert(entity: &ResolvedEntity, body: &Record) -> Result<Record, AppError> {
    entity
        .input_columns()
        .map(|c| Ok((c.name.to_string(), value_or_zero(c, body)?)))
        .collect()
}

/// Values for a PUT: every writable column is written, omitted ones reset to their zero value.
pub fn build_overwrite(entity: &ResolvedEntity, body: &Record) -> Result<Record, AppError> {
    entity
        .writable_columns()
        .map(|c| Ok((c.name.to_string(), value_or_zero(c, body)?)))
        .collect()
}

/// Values for a PATCH: only the writable columns present in the body.
pub fn build_merge(entity: &ResolvedEntity, body: &Record) -> Result<Record, AppError> {
    entity
        .writable_columns()
        .filter_map(|c| body.get(c.name).map(|v| (c, v)))
        .map(|(c, v)| Ok((c.name.to_string(), coerce(c, v)?)))
        .collect()
}

/// Response form of a stored record: hidden columns removed.
pub fn present(entity: &ResolvedEntity, mut record: Record) -> Value {
    for c in entity.columns.iter().filter(|c| c.hidden) {
        record.remove(c.name);
    }
    Value::Object(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{builtin_entities, resolve};
    use serde_json::json;

    fn body(v: Value) -> Record {
        into_record(v).unwrap()
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(into_record(json!([1, 2])).is_err());
        assert!(into_record(json!("x")).is_err());
    }

    #[test]
    fn overwrite_fills_zero_values() {
        let catalog = resolve(&builtin_entities()).unwrap();
        let roles = catalog.entity_by_path("roles").unwrap();
        let values = build_overwrite(roles, &body(json!({"description": "x", "id": 9, "created_at": "2020-01-01T00:00:00Z"}))).unwrap();
        assert_eq!(Value::Object(values), json!({"name": "", "description": "x", "is_system": false}));
    }

    #[test]
    fn merge_keeps_only_present_fields() {
        let catalog = resolve(&builtin_entities()).unwrap();
        let users = catalog.entity_by_path("users").unwrap();
        let values = build_merge(users, &body(json!({"full_name": "Ann", "last_login_at": null, "bogus": 1}))).unwrap();
        assert_eq!(Value::Object(values), json!({"full_name": "Ann", "last_login_at": null}));
    }

    #[test]
    fn insert_includes_composite_keys() {
        let catalog = resolve(&builtin_entities()).unwrap();
        let members = catalog.entity_by_path("organization_members").unwrap();
        let values = build_insert(members, &body(json!({"organization_id": 3, "user_id": 4}))).unwrap();
        assert_eq!(
            Value::Object(values),
            json!({"organization_id": 3, "user_id": 4, "member_role": ""})
        );
    }

    #[test]
    fn present_strips_hidden_columns() {
        let catalog = resolve(&builtin_entities()).unwrap();
        let users = catalog.entity_by_path("users").unwrap();
        let out = present(users, body(json!({"id": 1, "username": "ann", "password_hash": "h"})));
        assert_eq!(out, json!({"id": 1, "username": "ann"}));
    }
}

//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved entity.

use crate::error::AppError;
use crate::repository::{Record, RecordKey};
use crate::schema::{ColumnInfo, ResolvedEntity, CREATED_AT, UPDATED_AT};
use crate::sql::SqlValue;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a column value and return its placeholder with the column's cast, e.g. `$3::timestamptz`.
    fn push_column(&mut self, column: &ColumnInfo, values: &Record) -> Result<String, AppError> {
        let v = SqlValue::from_json(column, values.get(column.name))?;
        let n = self.push_param(v);
        Ok(format!("${}::{}", n, column.kind.pg_type()))
    }

    /// `"a" = $n AND "b" = $m` over the entity's key columns.
    fn push_key(&mut self, entity: &ResolvedEntity, key: RecordKey) -> String {
        entity
            .key_columns
            .iter()
            .zip(key.parts())
            .map(|(col, part)| {
                let n = self.push_param(SqlValue::BigInt(part as i64));
                format!("{} = ${}", quoted(col), n)
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn select_column_list(entity: &ResolvedEntity) -> String {
    entity
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_by(entity: &ResolvedEntity) -> String {
    entity
        .key_columns
        .iter()
        .map(|c| quoted(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT one row by key.
pub fn select_by_key(entity: &ResolvedEntity, key: RecordKey) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.push_key(entity, key);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(entity),
        quoted(entity.table_name),
        where_clause
    );
    q
}

/// SELECT one page ordered by key. Limit and offset are inlined (numbers only).
pub fn select_page(entity: &ResolvedEntity, limit: u64, offset: u64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(entity),
        quoted(entity.table_name),
        order_by(entity),
        limit.min(i64::MAX as u64),
        offset.min(i64::MAX as u64)
    );
    q
}

pub fn count(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", quoted(entity.table_name));
    q
}

/// INSERT input columns from `values`; created_at/updated_at are set by the database clock.
pub fn insert(entity: &ResolvedEntity, values: &Record) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.input_columns() {
        placeholders.push(q.push_column(c, values)?);
        cols.push(quoted(c.name));
    }
    for name in [CREATED_AT, UPDATED_AT] {
        if entity.has_audit_column(name) {
            cols.push(quoted(name));
            placeholders.push("NOW()".to_string());
        }
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(entity.table_name),
            select_column_list(entity)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(entity.table_name),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(entity)
        )
    };
    Ok(q)
}

/// UPDATE every writable column present in `values`, plus updated_at when tracked.
/// With nothing to set, falls back to a SELECT by key so the caller still gets the row.
pub fn update(entity: &ResolvedEntity, key: RecordKey, values: &Record) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in entity.writable_columns() {
        if !values.contains_key(c.name) {
            continue;
        }
        let rhs = q.push_column(c, values)?;
        sets.push(format!("{} = {}", quoted(c.name), rhs));
    }
    if entity.audit.touches_updated_at() {
        sets.push(format!("{} = NOW()", quoted(UPDATED_AT)));
    }
    if sets.is_empty() {
        return Ok(select_by_key(entity, key));
    }
    let where_clause = q.push_key(entity, key);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        quoted(entity.table_name),
        sets.join(", "),
        where_clause,
        select_column_list(entity)
    );
    Ok(q)
}

/// DELETE by key, returning the key columns of the removed row.
pub fn delete(entity: &ResolvedEntity, key: RecordKey) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.push_key(entity, key);
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        quoted(entity.table_name),
        where_clause,
        order_by(entity)
    );
    q
}

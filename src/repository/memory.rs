//! In-process store: one ordered map per table behind an async lock.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{Record, RecordKey, Repository};
use crate::error::AppError;
use crate::schema::resolved::ID_COLUMN;
use crate::schema::value::now;
use crate::schema::{ResolvedEntity, CREATED_AT, DELETED_AT, UPDATED_AT};

#[derive(Debug, Default)]
struct Table {
    last_id: u64,
    rows: BTreeMap<RecordKey, Record>,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create(&self, entity: &ResolvedEntity, values: &Record) -> Result<Record, AppError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(entity.table_name).or_default();

        let mut record = Record::new();
        for c in entity.input_columns() {
            record.insert(c.name.to_string(), values.get(c.name).cloned().unwrap_or(Value::Null));
        }

        let key = if entity.is_composite() {
            RecordKey::of(entity, &record)
                .ok_or_else(|| AppError::Store(format!("{}: missing key columns", entity.table_name)))?
        } else {
            table.last_id += 1;
            record.insert(ID_COLUMN.to_string(), Value::from(table.last_id));
            RecordKey::Id(table.last_id)
        };
        if table.rows.contains_key(&key) {
            return Err(AppError::Store(format!(
                "{}: duplicate key {:?}",
                entity.table_name,
                key.parts()
            )));
        }

        let ts = now();
        for name in entity.audit.columns() {
            let v = if *name == DELETED_AT { Value::Null } else { ts.clone() };
            record.insert(name.to_string(), v);
        }

        tracing::debug!(table = entity.table_name, key = ?key, "memory insert");
        table.rows.insert(key, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<Option<Record>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.get(entity.table_name).and_then(|t| t.rows.get(&key)).cloned())
    }

    async fn get_all(&self, entity: &ResolvedEntity, limit: u64, offset: u64) -> Result<(Vec<Record>, u64), AppError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(entity.table_name) else {
            return Ok((Vec::new(), 0));
        };
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let rows = table.rows.values().skip(skip).take(take).cloned().collect();
        Ok((rows, table.rows.len() as u64))
    }

    async fn update(&self, entity: &ResolvedEntity, key: RecordKey, values: &Record) -> Result<Option<Record>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.get_mut(entity.table_name).and_then(|t| t.rows.get_mut(&key)) else {
            return Ok(None);
        };
        for c in entity.writable_columns() {
            if let Some(v) = values.get(c.name) {
                record.insert(c.name.to_string(), v.clone());
            }
        }
        if entity.audit.touches_updated_at() {
            record.insert(UPDATED_AT.to_string(), now());
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(entity.table_name)
            .and_then(|t| t.rows.remove(&key))
            .is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

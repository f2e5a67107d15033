//! Data access: one generic repository contract over every catalog entity.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::schema::value::MAX_UINT;
use crate::schema::ResolvedEntity;

/// A stored row keyed by column name.
pub type Record = Map<String, Value>;

/// Primary key of a record: a single `id` or a pair of foreign references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    Id(u64),
    Pair(u64, u64),
}

impl RecordKey {
    /// Parse path segments (in key column order) into a key for `entity`.
    pub fn parse(entity: &ResolvedEntity, segments: &[String]) -> Result<Self, AppError> {
        if segments.len() != entity.key_columns.len() {
            return Err(AppError::InvalidInput("invalid id".into()));
        }
        let parts = segments
            .iter()
            .zip(&entity.key_columns)
            .map(|(s, col)| parse_id(s, col))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match parts.as_slice() {
            [id] => RecordKey::Id(*id),
            [a, b] => RecordKey::Pair(*a, *b),
            _ => return Err(AppError::InvalidInput("invalid id".into())),
        })
    }

    /// Read the key out of a record's key columns.
    pub fn of(entity: &ResolvedEntity, record: &Record) -> Option<Self> {
        let part = |name: &str| record.get(name).and_then(Value::as_u64);
        match entity.key_columns.as_slice() {
            [id] => Some(RecordKey::Id(part(*id)?)),
            [a, b] => Some(RecordKey::Pair(part(*a)?, part(*b)?)),
            _ => None,
        }
    }

    pub fn parts(&self) -> Vec<u64> {
        match *self {
            RecordKey::Id(id) => vec![id],
            RecordKey::Pair(a, b) => vec![a, b],
        }
    }
}

fn parse_id(s: &str, column: &str) -> Result<u64, AppError> {
    s.parse::<u64>()
        .ok()
        .filter(|n| *n <= MAX_UINT)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid {}: '{}'", column, s)))
}

/// Create / GetByID / GetAll / Update / Delete against a store.
///
/// `values` passed to `create` and `update` are already validated and coerced by the
/// service layer; the repository assigns ids and audit timestamps.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create(&self, entity: &ResolvedEntity, values: &Record) -> Result<Record, AppError>;

    async fn get_by_id(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<Option<Record>, AppError>;

    /// One page of records in key order, plus the total row count.
    async fn get_all(&self, entity: &ResolvedEntity, limit: u64, offset: u64) -> Result<(Vec<Record>, u64), AppError>;

    /// Rewrite the given columns. Returns `None` when no row has `key`.
    async fn update(&self, entity: &ResolvedEntity, key: RecordKey, values: &Record) -> Result<Option<Record>, AppError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<bool, AppError>;

    /// Cheap liveness check used by `/ready`.
    async fn ping(&self) -> Result<(), AppError>;
}

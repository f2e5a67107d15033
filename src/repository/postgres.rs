//! PostgreSQL store over a shared connection pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use super::{Record, RecordKey, Repository};
use crate::error::AppError;
use crate::schema::value::format_timestamp;
use crate::schema::{FieldKind, ResolvedEntity};
use crate::settings::Settings;
use crate::sql::{self, QueryBuf};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        PgRepository { pool }
    }

    pub async fn connect(database_url: &str, settings: &Settings) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(settings.db_acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<PgRow>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = sql::bind(query, p);
        }
        query.fetch_optional(&self.pool).await
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = sql::bind(query, p);
        }
        query.fetch_all(&self.pool).await
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create(&self, entity: &ResolvedEntity, values: &Record) -> Result<Record, AppError> {
        let q = sql::insert(entity, values)?;
        let row = self.fetch_optional(&q).await?.ok_or(sqlx::Error::RowNotFound)?;
        Ok(row_to_record(entity, &row)?)
    }

    async fn get_by_id(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<Option<Record>, AppError> {
        let q = sql::select_by_key(entity, key);
        let row = self.fetch_optional(&q).await?;
        Ok(row.map(|r| row_to_record(entity, &r)).transpose()?)
    }

    async fn get_all(&self, entity: &ResolvedEntity, limit: u64, offset: u64) -> Result<(Vec<Record>, u64), AppError> {
        let count = sql::count(entity);
        tracing::debug!(sql = %count.sql, "query");
        let total = sqlx::query_scalar::<_, i64>(&count.sql).fetch_one(&self.pool).await?;

        let q = sql::select_page(entity, limit, offset);
        let rows = self
            .fetch_all(&q)
            .await?
            .iter()
            .map(|r| row_to_record(entity, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((rows, total.max(0) as u64))
    }

    async fn update(&self, entity: &ResolvedEntity, key: RecordKey, values: &Record) -> Result<Option<Record>, AppError> {
        let q = sql::update(entity, key, values)?;
        let row = self.fetch_optional(&q).await?;
        Ok(row.map(|r| row_to_record(entity, &r)).transpose()?)
    }

    async fn delete(&self, entity: &ResolvedEntity, key: RecordKey) -> Result<bool, AppError> {
        let q = sql::delete(entity, key);
        Ok(self.fetch_optional(&q).await?.is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Decode a row column by column using the catalog's kinds.
fn row_to_record(entity: &ResolvedEntity, row: &PgRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for c in &entity.columns {
        let v = match c.kind {
            FieldKind::Text => row.try_get::<Option<String>, _>(c.name)?.map(Value::String),
            FieldKind::Bool => row.try_get::<Option<bool>, _>(c.name)?.map(Value::Bool),
            FieldKind::UInt => row
                .try_get::<Option<i64>, _>(c.name)?
                .and_then(|n| u64::try_from(n).ok())
                .map(Value::from),
            FieldKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(c.name)?
                .map(|ts| Value::String(format_timestamp(ts))),
        };
        record.insert(c.name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(record)
}

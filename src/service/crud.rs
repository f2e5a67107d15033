//! Generic CRUD over any catalog entity: validation, record construction, repository calls.

use serde_json::Value;

use super::record::{build_insert, build_merge, build_overwrite, present};
use super::RequestValidator;
use crate::error::AppError;
use crate::pagination::{Page, PageMeta, PageRequest};
use crate::repository::{Record, RecordKey, Repository};
use crate::schema::ResolvedEntity;

/// How an update treats fields missing from the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: every writable field is written; omitted fields reset to their zero value.
    Overwrite,
    /// PATCH: only fields present in the body are written.
    Merge,
}

pub struct CrudService;

impl CrudService {
    pub async fn list(repo: &dyn Repository, entity: &ResolvedEntity, request: PageRequest) -> Result<Page<Value>, AppError> {
        let (rows, total) = repo.get_all(entity, request.limit, request.offset()).await?;
        let page = Page {
            data: rows,
            meta: PageMeta::new(request, total),
        };
        Ok(page.map(|r| present(entity, r)))
    }

    pub async fn create(repo: &dyn Repository, entity: &ResolvedEntity, body: &Record) -> Result<Value, AppError> {
        RequestValidator::validate(entity, body)?;
        let values = build_insert(entity, body)?;
        let row = repo.create(entity, &values).await?;
        Ok(present(entity, row))
    }

    pub async fn read(repo: &dyn Repository, entity: &ResolvedEntity, key: RecordKey) -> Result<Value, AppError> {
        let row = repo
            .get_by_id(entity, key)
            .await?
            .ok_or_else(|| AppError::NotFound(entity.label.to_string()))?;
        Ok(present(entity, row))
    }

    /// Fetch, then rewrite. A row vanishing between the two steps is also NotFound.
    pub async fn update(
        repo: &dyn Repository,
        entity: &ResolvedEntity,
        key: RecordKey,
        body: &Record,
        mode: UpdateMode,
    ) -> Result<Value, AppError> {
        let not_found = || AppError::NotFound(entity.label.to_string());
        RequestValidator::validate_partial(entity, body)?;
        repo.get_by_id(entity, key).await?.ok_or_else(not_found)?;
        let values = match mode {
            UpdateMode::Overwrite => build_overwrite(entity, body)?,
            UpdateMode::Merge => build_merge(entity, body)?,
        };
        let row = repo.update(entity, key, &values).await?.ok_or_else(not_found)?;
        Ok(present(entity, row))
    }

    pub async fn delete(repo: &dyn Repository, entity: &ResolvedEntity, key: RecordKey) -> Result<(), AppError> {
        if !repo.delete(entity, key).await? {
            return Err(AppError::NotFound(entity.label.to_string()));
        }
        Ok(())
    }
}

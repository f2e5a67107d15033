//! Entity CRUD handlers: list, create, read, replace, update, delete.
//!
//! The entity is attached to each route as an `Extension`, so one set of handlers
//! serves the whole catalog.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Extension, Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::pagination::PageRequest;
use crate::repository::RecordKey;
use crate::response::{success_created, success_message, success_one, success_page};
use crate::schema::ResolvedEntity;
use crate::service::{into_record, CrudService, UpdateMode};
use crate::state::AppState;

type KeyPath = Result<Path<Vec<(String, String)>>, PathRejection>;

fn parse_key(entity: &ResolvedEntity, path: KeyPath) -> Result<RecordKey, AppError> {
    let Path(params) = path.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let segments: Vec<String> = params.into_iter().map(|(_, v)| v).collect();
    RecordKey::parse(entity, &segments)
}

pub async fn list(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = query?;
    let request = PageRequest::from_query(&params);
    let page = CrudService::list(state.repository.as_ref(), &entity, request).await?;
    Ok(success_page(format!("{} list retrieved successfully", entity.label), page))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let body = into_record(body)?;
    let row = CrudService::create(state.repository.as_ref(), &entity, &body).await?;
    tracing::info!(entity = entity.path_segment, actor = %user.subject, "created");
    Ok(success_created(format!("{} created successfully", entity.label), row))
}

pub async fn read(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    path: KeyPath,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_key(&entity, path)?;
    let row = CrudService::read(state.repository.as_ref(), &entity, key).await?;
    Ok(success_one(format!("{} retrieved successfully", entity.label), row))
}

async fn write(
    state: AppState,
    entity: Arc<ResolvedEntity>,
    user: CurrentUser,
    path: KeyPath,
    body: Result<Json<Value>, JsonRejection>,
    mode: UpdateMode,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_key(&entity, path)?;
    let Json(body) = body?;
    let body = into_record(body)?;
    let row = CrudService::update(state.repository.as_ref(), &entity, key, &body, mode).await?;
    tracing::info!(entity = entity.path_segment, key = ?key, actor = %user.0.subject, mode = ?mode, "updated");
    Ok(success_one(format!("{} updated successfully", entity.label), row))
}

/// PUT: omitted fields are reset to their zero value.
pub async fn replace(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    user: CurrentUser,
    path: KeyPath,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    write(state, entity, user, path, body, UpdateMode::Overwrite).await
}

/// PATCH: only fields present in the body change.
pub async fn update(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    user: CurrentUser,
    path: KeyPath,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    write(state, entity, user, path, body, UpdateMode::Merge).await
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    CurrentUser(user): CurrentUser,
    path: KeyPath,
) -> Result<impl IntoResponse, AppError> {
    let key = parse_key(&entity, path)?;
    CrudService::delete(state.repository.as_ref(), &entity, key).await?;
    tracing::info!(entity = entity.path_segment, key = ?key, actor = %user.subject, "deleted");
    Ok(success_message(format!("{} deleted successfully", entity.label)))
}

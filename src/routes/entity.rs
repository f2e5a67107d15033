//! Entity CRUD routes built from the resolved catalog.
//! Each entity gets its own router carrying the entity as an `Extension`; all of them sit behind the bearer gate.

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};

use crate::auth::require_bearer;
use crate::handlers::entity::{create, delete as delete_handler, list, read, replace, update};
use crate::schema::ResolvedEntity;
use crate::state::AppState;

/// `/{path}` for the collection, `/{path}/:id` or `/{path}/:a/:b` for one record.
fn entity_router(entity: Arc<ResolvedEntity>) -> Router<AppState> {
    let collection = format!("/{}", entity.path_segment);
    let key = entity
        .key_columns
        .iter()
        .map(|c| format!(":{}", c))
        .collect::<Vec<_>>()
        .join("/");
    let item = format!("{}/{}", collection, key);
    tracing::debug!(collection = %collection, item = %item, "entity routes");
    Router::new()
        .route(&collection, get(list).post(create))
        .route(
            &item,
            get(read).put(replace).patch(update).delete(delete_handler),
        )
        .layer(Extension(entity))
}

pub fn entity_routes(state: AppState) -> Router {
    let router = state
        .catalog
        .entities()
        .iter()
        .cloned()
        .fold(Router::new(), |router, entity| router.merge(entity_router(entity)));
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

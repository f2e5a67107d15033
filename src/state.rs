//! Shared application state for all routes.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::repository::Repository;
use crate::schema::Catalog;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub catalog: Arc<Catalog>,
    pub verifier: Arc<dyn TokenVerifier>,
}

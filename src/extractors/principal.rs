//! Extract the authenticated caller placed in extensions by the bearer middleware.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::Principal;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthenticated("missing bearer token".into()))
    }
}

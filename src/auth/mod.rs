//! Bearer-token gate in front of the entity routes.

mod token;

pub use token::JwtVerifier;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::state::AppState;

/// Caller identity taken from a verified token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub subject: String,
    pub token_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, AppError>;
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Rejects requests without a valid bearer token; on success the [`Principal`] is
/// stored in request extensions for handlers.
pub async fn require_bearer(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&req) else {
        tracing::warn!(path = %req.uri().path(), "missing bearer token");
        return Err(AppError::Unauthenticated("missing bearer token".into()));
    };
    let principal = state.verifier.verify(token).map_err(|err| {
        tracing::warn!(path = %req.uri().path(), error = %err, "rejected bearer token");
        err
    })?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/roles");
        if let Some(v) = auth {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&request(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&request(Some("bearer  abc "))), Some("abc"));
        assert_eq!(bearer_token(&request(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request(None)), None);
    }
}

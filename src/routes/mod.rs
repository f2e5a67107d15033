//! Router assembly.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use axum::{
    http::{
        header::{ALLOW, CONTENT_TYPE},
        StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::response::ApiResponse;
use crate::settings::Settings;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Full application: common routes at the root, entity routes under [`API_PREFIX`].
pub fn build_app(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, entity_routes(state))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(middleware::map_response(envelope_bare_errors))
        .layer(TraceLayer::new_for_http())
}

/// Rewrites the empty or plain-text failures produced by layers and routing
/// (timeout, body limit, unknown route, wrong method) into the JSON envelope.
async fn envelope_bare_errors(res: Response) -> Response {
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return res;
    }
    let status = res.status();
    let (message, code) = match status {
        StatusCode::REQUEST_TIMEOUT => ("request timed out", "timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => ("request body too large", "payload_too_large"),
        StatusCode::NOT_FOUND => ("route not found", "not_found"),
        StatusCode::METHOD_NOT_ALLOWED => ("method not allowed", "method_not_allowed"),
        _ => return res,
    };
    let mut out = (status, Json(ApiResponse::<()>::failure(message, code))).into_response();
    if let Some(allow) = res.headers().get(ALLOW) {
        out.headers_mut().insert(ALLOW, allow.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn timeouts_get_the_envelope() {
        let res = envelope_bare_errors(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "timeout");
    }

    #[tokio::test]
    async fn plain_text_limit_errors_get_the_envelope() {
        let res = envelope_bare_errors((StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response()).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(res).await["error"], "payload_too_large");
    }

    #[tokio::test]
    async fn envelopes_and_successes_pass_through() {
        let res = envelope_bare_errors(AppError::NotFound("Role".into()).into_response()).await;
        assert_eq!(body_json(res).await["message"], "Role not found");

        let res = envelope_bare_errors(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}

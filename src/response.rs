//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::pagination::{Page, PageMeta};

/// Envelope shared by every entity endpoint: a success flag, a message and an optional payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data,
            pagination: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: &'static str) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            pagination: None,
            error: Some(code),
        }
    }
}

pub fn success_one<T: Serialize>(message: impl Into<String>, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::OK, Json(ApiResponse::ok(message, Some(data))))
}

pub fn success_created<T: Serialize>(message: impl Into<String>, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(message, Some(data))))
}

pub fn success_page<T: Serialize>(message: impl Into<String>, page: Page<T>) -> (StatusCode, Json<ApiResponse<Vec<T>>>) {
    let mut body = ApiResponse::ok(message, Some(page.data));
    body.pagination = Some(page.meta);
    (StatusCode::OK, Json(body))
}

pub fn success_message(message: impl Into<String>) -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::OK, Json(ApiResponse::ok(message, None)))
}

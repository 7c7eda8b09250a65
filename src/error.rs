/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthError / RepoError / JSON body rejection を統一的に変換
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

/// `{success: false, error: <int>, message: <string>}`; auth failures also carry `code`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("request timeout")]
    Timeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::Unprocessable(detail.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // Every authorization failure goes out as 401. The logical status
            // (400/403/500 for some kinds) is reported in the body only.
            AppError::Auth(err) => {
                tracing::warn!(code = err.code(), error = %err, "authorization failed");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        success: false,
                        error: err.status().as_u16(),
                        message: err.description().to_string(),
                        code: Some(err.code()),
                    },
                )
            }
            other => {
                let (status, message) = match other {
                    AppError::BadRequest(detail) => {
                        tracing::debug!(%detail, "bad request");
                        (StatusCode::BAD_REQUEST, "bad request")
                    }
                    AppError::NotFound { resource } => {
                        tracing::debug!(resource, "not found");
                        (StatusCode::NOT_FOUND, "resource not found")
                    }
                    AppError::Unprocessable(detail) => {
                        tracing::debug!(%detail, "unprocessable");
                        (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable")
                    }
                    AppError::PayloadTooLarge => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "payload too large")
                    }
                    AppError::Timeout => (StatusCode::REQUEST_TIMEOUT, "request timeout"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
                };
                (
                    status,
                    ErrorResponse {
                        success: false,
                        error: status.as_u16(),
                        message: message.to_string(),
                        code: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::unprocessable("drink title already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON with the wrong shape
            JsonRejection::JsonDataError(e) => AppError::unprocessable(e.body_text()),
            // Body cut off by REQUEST_BODY_LIMIT_BYTES
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::debug!(detail = %other.body_text(), "request body too large");
                AppError::PayloadTooLarge
            }
            other => AppError::bad_request(other.body_text()),
        }
    }
}

//! Error types
//!
//! `AppError` covers every failure a store operation can return and maps each
//! kind onto an HTTP status. `LogError` is only raised while building the
//! remote logging client; sending a log never fails.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::ApiResponse;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad URL, out-of-range validity, or malformed custom code
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Custom short code already in use
    #[error("Short code already exists")]
    Collision { short_code: String },

    /// Store holds its maximum number of live records
    #[error("Maximum of {capacity} URLs allowed")]
    LimitReached { capacity: usize },

    /// Lookup miss, or the code has expired
    #[error("Short URL not found or has expired")]
    NotFound { short_code: String },
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(short_code: impl Into<String>) -> Self {
        Self::NotFound {
            short_code: short_code.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Collision { .. } => "conflict",
            AppError::LimitReached { .. } => "limit_reached",
            AppError::NotFound { .. } => "not_found",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Collision { .. } => StatusCode::CONFLICT,
            AppError::LimitReached { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// Malformed or mistyped request bodies are validation failures
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiResponse::failure(self.kind(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

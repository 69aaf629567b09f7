//! HTTP error responses
//!
//! Every failure a handler can produce becomes an [`ApiError`], which renders as
//! `{"error": {"code": ..., "message": ...}}` with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rltr_core::{ErrorSeverity, RltrError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request parameters (400 Bad Request)
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Unknown collection or record (404 Not Found)
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Anything the caller cannot fix (500 Internal Server Error)
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Validation { message: message.into(), field: field.map(str::to_string) }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn to_response(&self) -> ApiErrorResponse {
        let field = match self {
            ApiError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        ApiErrorResponse {
            error: ApiErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
                field,
            },
        }
    }
}

impl From<RltrError> for ApiError {
    fn from(err: RltrError) -> Self {
        match err.severity() {
            ErrorSeverity::Warning => {
                warn!(category = err.category(), severity = %err.severity(), error = %err, "Core error")
            }
            ErrorSeverity::Fatal => {
                error!(category = err.category(), severity = %err.severity(), error = %err, "Core error")
            }
        }
        match err {
            RltrError::UnknownCollection { name } => ApiError::not_found(format!("collection '{name}'")),
            RltrError::InvalidRangeBound { ref field, .. } => {
                ApiError::validation(err.to_string(), Some(field.as_str()))
            }
            other => ApiError::Internal { message: other.to_string() },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error_code = self.error_code(), error = %self, "Request failed");
        } else {
            warn!(error_code = self.error_code(), error = %self, "Request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

pub type ApiResult<T> = Result<T, ApiError>;

//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::{DomainError, Message};

pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";
pub const SIGN_IN_PATH: &str = "/signin";

/// Error body: a danger message, a stable code and an optional redirect hint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: Message,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub redirect: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                message: Message::danger(text),
                code: code.into(),
                redirect: None,
            },
        }
    }

    /// Tell the client where to go next
    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.response.redirect = Some(path.into());
        self
    }

    pub fn bad_request(text: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_failed", text)
    }

    pub fn unauthorized(text: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", text).with_redirect(SIGN_IN_PATH)
    }

    pub fn forbidden(text: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", text)
    }

    pub fn not_found(text: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", text)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", GENERIC_FAILURE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Unauthenticated { message } => Self::unauthorized(message),
            DomainError::Unverified { message } => {
                Self::new(StatusCode::UNAUTHORIZED, "unverified", message)
                    .with_redirect(SIGN_IN_PATH)
            }
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidId { message } => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_id", message)
            }
            DomainError::Conflict { message } => {
                Self::new(StatusCode::BAD_REQUEST, "conflict", message)
            }
            DomainError::DependencyFailed {
                dependency,
                message,
            } => {
                error!(dependency = %dependency, message = %message, "Dependency failed");
                Self::new(StatusCode::BAD_GATEWAY, "dependency_failed", message)
            }
            DomainError::PartialWrite { operation, message } => {
                error!(operation = %operation, message = %message, "Partial write");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "partial_write", GENERIC_FAILURE)
            }
            other @ (DomainError::Storage { .. }
            | DomainError::Internal { .. }
            | DomainError::Configuration { .. }) => {
                error!(error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}

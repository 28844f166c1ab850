//! Error handling module
//!
//! Provides unified error types and handling for the entire application.
//! Authentication failures are normalized here: every login failure shares one
//! message, and every token failure shares one 401 body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Message returned for every failed login, whatever the underlying cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Message returned for every missing, malformed, forged or expired token
pub const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The inner reason is for diagnostics only and never reaches the client
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "BAD_CREDENTIALS",
                INVALID_CREDENTIALS_MESSAGE.to_string(),
                None,
            ),
            AppError::Unauthenticated(reason) => {
                debug!("Rejected unauthenticated request: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHENTICATED",
                    UNAUTHENTICATED_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                msg.clone(),
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                None,
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                None,
            ),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "A configuration error occurred".to_string(),
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_unauthenticated_hides_reason() {
        let (status_a, body_a) = render(AppError::Unauthenticated("token expired".to_string())).await;
        let (status_b, body_b) = render(AppError::Unauthenticated("bad signature".to_string())).await;

        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_b, StatusCode::UNAUTHORIZED);
        assert_eq!(body_a, body_b);
        assert!(body_a.contains(UNAUTHENTICATED_MESSAGE));
        for body in [&body_a, &body_b] {
            assert!(!body.contains("token expired"));
            assert!(!body.contains("bad signature"));
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("ROLE_ADMIN".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            not_found_error("user").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            validation_error("blank").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}

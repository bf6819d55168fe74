//! HTTP error types
//!
//! Errors raised by the HTTP layer and their JSON rendering. Sign-in
//! failures never reach this type: the auth actions turn them into
//! redirects, so verifier error kinds are not exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use latchkey_auth::AuthError;
use serde_json::json;
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// HTTP server errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Server startup failed: {message}")]
    StartupFailed { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Unknown auth action: {action}")]
    UnknownAction { action: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl HttpError {
    /// Create a startup error
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::StartupFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        HttpError::ConfigError {
            message: message.into(),
        }
    }

    pub fn unknown_action<T: Into<String>>(action: T) -> Self {
        HttpError::UnknownAction {
            action: action.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::StartupFailed { .. } => "SERVER_STARTUP_FAILED",
            HttpError::ConfigError { .. } => "CONFIGURATION_ERROR",
            HttpError::UnknownAction { .. } => "UNKNOWN_ACTION",
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::Unauthorized => "UNAUTHORIZED_ACCESS",
            HttpError::Forbidden { .. } => "ACCESS_FORBIDDEN",
            HttpError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::StartupFailed { .. }
            | HttpError::ConfigError { .. }
            | HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::UnknownAction { .. } | HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Get error hint for user guidance
    pub fn error_hint(&self) -> Option<&'static str> {
        match self {
            HttpError::UnknownAction { .. } => Some("See /api/auth/providers for the supported sign-in endpoints"),
            HttpError::BadRequest { .. } => Some("Send the body as application/x-www-form-urlencoded or application/json"),
            _ => None,
        }
    }
}

impl From<latchkey_core::ConfigError> for HttpError {
    fn from(err: latchkey_core::ConfigError) -> Self {
        HttpError::ConfigError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::CsrfMismatch => HttpError::forbidden(err.to_string()),
            AuthError::ConfigurationError { message } => HttpError::ConfigError { message },
            err if err.status_code() == 401 => HttpError::Unauthorized,
            err => HttpError::internal(err.to_string()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "hint": self.error_hint()
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_is_bad_request() {
        let err = HttpError::unknown_action("teleport");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "UNKNOWN_ACTION");
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_auth_error_conversion() {
        assert!(matches!(HttpError::from(AuthError::InvalidPassword), HttpError::Unauthorized));
        assert!(matches!(HttpError::from(AuthError::CsrfMismatch), HttpError::Forbidden { .. }));
        assert!(matches!(
            HttpError::from(AuthError::crypto_error("bad hash")),
            HttpError::InternalError { .. }
        ));
        assert!(matches!(
            HttpError::from(AuthError::config_error("no store")),
            HttpError::ConfigError { .. }
        ));
    }

    #[test]
    fn test_into_response_status() {
        let response = HttpError::bad_request("malformed body").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

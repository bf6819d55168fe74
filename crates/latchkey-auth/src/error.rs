//! Authentication error types

use latchkey_core::ConfigError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email or password absent or empty
    #[error("Missing credentials")]
    MissingCredentials,

    /// No stored user matches the submitted email
    #[error("User not found")]
    UserNotFound,

    /// The password does not match the stored hash
    #[error("Invalid password")]
    InvalidPassword,

    /// The user store could not be reached or queried
    #[error("User lookup failed: {message}")]
    LookupFailure { message: String },

    /// Session token could not be signed or verified
    #[error("Token error: {message}")]
    TokenError { message: String },

    /// Submitted CSRF token does not match the CSRF cookie
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// Hashing primitive failed
    #[error("Cryptographic error: {message}")]
    CryptographicError { message: String },

    /// Invalid or missing configuration
    #[error("Authentication configuration error: {message}")]
    ConfigurationError { message: String },
}

impl AuthError {
    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InvalidPassword => "INVALID_PASSWORD",
            AuthError::LookupFailure { .. } => "LOOKUP_FAILURE",
            AuthError::TokenError { .. } => "TOKEN_ERROR",
            AuthError::CsrfMismatch => "CSRF_MISMATCH",
            AuthError::CryptographicError { .. } => "CRYPTOGRAPHIC_ERROR",
            AuthError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredentials => 401,
            AuthError::UserNotFound => 401, // Don't reveal user existence
            AuthError::InvalidPassword => 401,
            AuthError::LookupFailure { .. } => 401,
            AuthError::TokenError { .. } => 401,
            AuthError::CsrfMismatch => 403,
            AuthError::CryptographicError { .. } => 500,
            AuthError::ConfigurationError { .. } => 500,
        }
    }

    /// Whether this error ends a credentials sign-in attempt.
    ///
    /// All of these surface to the client as the same generic outcome.
    pub fn is_sign_in_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials
                | AuthError::UserNotFound
                | AuthError::InvalidPassword
                | AuthError::LookupFailure { .. }
                | AuthError::CryptographicError { .. }
        )
    }

    /// Create a lookup failure
    pub fn lookup_failure(message: impl Into<String>) -> Self {
        Self::LookupFailure { message: message.into() }
    }

    /// Create a token error
    pub fn token_error(message: impl Into<String>) -> Self {
        Self::TokenError { message: message.into() }
    }

    /// Create a cryptographic error
    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::CryptographicError { message: message.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::token_error(err.to_string())
    }
}

#[cfg(feature = "bcrypt")]
impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::crypto_error(err.to_string())
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::lookup_failure(err.to_string())
    }
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        Self::config_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::MissingCredentials.error_code(), "MISSING_CREDENTIALS");
        assert_eq!(AuthError::lookup_failure("down").error_code(), "LOOKUP_FAILURE");
        assert_eq!(AuthError::CsrfMismatch.error_code(), "CSRF_MISMATCH");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::UserNotFound.status_code(), 401);
        assert_eq!(AuthError::InvalidPassword.status_code(), 401);
        assert_eq!(AuthError::CsrfMismatch.status_code(), 403);
        assert_eq!(AuthError::config_error("test").status_code(), 500);
    }

    #[test]
    fn test_sign_in_failures() {
        assert!(AuthError::MissingCredentials.is_sign_in_failure());
        assert!(AuthError::UserNotFound.is_sign_in_failure());
        assert!(AuthError::InvalidPassword.is_sign_in_failure());
        assert!(AuthError::lookup_failure("timeout").is_sign_in_failure());
        assert!(!AuthError::CsrfMismatch.is_sign_in_failure());
        assert!(!AuthError::token_error("expired").is_sign_in_failure());
    }

    #[test]
    fn test_error_display() {
        let err = AuthError::lookup_failure("connection refused");
        assert_eq!(err.to_string(), "User lookup failed: connection refused");

        let err: AuthError = ConfigError::missing_required("secret", "set AUTH_SECRET").into();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}

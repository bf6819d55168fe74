//! HTTP server configuration
//!
//! Request limits and tracing switches for the server, loaded through the
//! same [`AppConfigTrait`] contract as the rest of latchkey.

use super::defaults::HttpDefaults;
use latchkey_core::{parse_env, AppConfigTrait, ConfigError, ConfigSource};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// HTTP server specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Health check endpoint path
    pub health_check_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: HttpDefaults::REQUEST_TIMEOUT_SECS,
            max_request_size: HttpDefaults::MAX_REQUEST_SIZE,
            enable_tracing: HttpDefaults::ENABLE_TRACING,
            health_check_path: HttpDefaults::HEALTH_CHECK_PATH.to_string(),
        }
    }
}

impl AppConfigTrait for HttpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(secs) = parse_env::<u64>(
            "HTTP_REQUEST_TIMEOUT",
            "request_timeout_secs",
            "valid number of seconds",
        )? {
            config.request_timeout_secs = secs;
        }
        if let Some(size) = parse_env::<usize>(
            "HTTP_MAX_REQUEST_SIZE",
            "max_request_size",
            "valid number of bytes",
        )? {
            config.max_request_size = size;
        }
        if let Some(enabled) =
            parse_env::<bool>("HTTP_ENABLE_TRACING", "enable_tracing", "true or false")?
        {
            config.enable_tracing = enabled;
        }
        if let Ok(path) = env::var("HTTP_HEALTH_CHECK_PATH") {
            config.health_check_path = path;
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation_failed(
                "Request timeout must be greater than 0",
            ));
        }

        if self.max_request_size == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum request size must be greater than 0",
            ));
        }

        if !self.health_check_path.starts_with('/') || self.health_check_path.starts_with("/api/auth") {
            return Err(ConfigError::invalid_value(
                "health_check_path",
                self.health_check_path.clone(),
                "path starting with '/' outside /api/auth",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert(
            "request_timeout_secs".to_string(),
            ConfigSource::for_env("HTTP_REQUEST_TIMEOUT", &HttpDefaults::REQUEST_TIMEOUT_SECS.to_string()),
        );
        sources.insert(
            "max_request_size".to_string(),
            ConfigSource::for_env("HTTP_MAX_REQUEST_SIZE", &HttpDefaults::MAX_REQUEST_SIZE.to_string()),
        );
        sources.insert(
            "enable_tracing".to_string(),
            ConfigSource::for_env("HTTP_ENABLE_TRACING", &HttpDefaults::ENABLE_TRACING.to_string()),
        );
        sources.insert(
            "health_check_path".to_string(),
            ConfigSource::for_env("HTTP_HEALTH_CHECK_PATH", HttpDefaults::HEALTH_CHECK_PATH),
        );
        sources
    }
}

impl HttpConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

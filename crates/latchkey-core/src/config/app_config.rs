use crate::config::{ConfigError, ConfigSource};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Read and parse `key` from the environment.
///
/// Returns `Ok(None)` when the variable is unset and an
/// [`ConfigError::InvalidValue`] naming `field` when it does not parse.
pub fn parse_env<T: FromStr>(key: &str, field: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::invalid_value(field, raw, expected)),
        Err(_) => Ok(None),
    }
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Plain,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "plain" | "text" => Ok(LogFormat::Plain),
            _ => Err(ConfigError::invalid_value("log_format", s, "pretty, json, or plain")),
        }
    }
}

/// Process-level configuration: where to listen, what to log, where users live
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Postgres connection string for the user store; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            port: 0,
            log_level: "warn".to_string(),
            log_format: LogFormat::Plain,
            ..Self::new()
        }
    }

    /// Create configuration for production
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_format: LogFormat::Json,
            ..Self::new()
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if database is configured
    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigTrait for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Development,
        };

        let mut config = match environment {
            Environment::Development => Self::new(),
            Environment::Testing => Self::testing(),
            Environment::Production => Self::production(),
        };

        if let Some(port) = parse_env::<u16>("PORT", "port", "valid port number (0-65535)")? {
            config.port = port;
        }
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        config.database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level.to_lowercase();
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.environment.is_testing() && self.port == 0 {
            return Err(ConfigError::invalid_value(
                "port",
                self.port.to_string(),
                "port between 1 and 65535",
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                self.log_level.clone(),
                format!("one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if self.environment.is_production() && self.database_url.is_none() {
            return Err(ConfigError::missing_required(
                "database_url",
                "DATABASE_URL is required in production; the in-memory user store is for development only",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("environment".to_string(), ConfigSource::for_env("ENVIRONMENT", "development"));
        sources.insert("host".to_string(), ConfigSource::for_env("HOST", "127.0.0.1"));
        sources.insert("port".to_string(), ConfigSource::for_env("PORT", "3000"));
        sources.insert("database_url".to_string(), ConfigSource::for_env("DATABASE_URL", "in-memory store"));
        sources.insert("log_level".to_string(), ConfigSource::for_env("LOG_LEVEL", "info"));
        sources.insert("log_format".to_string(), ConfigSource::for_env("LOG_FORMAT", "pretty"));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in ["ENVIRONMENT", "PORT", "HOST", "DATABASE_URL", "LOG_LEVEL", "LOG_FORMAT"] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_port_validation_in_testing_environment() {
        let config = AppConfig::testing();
        assert_eq!(config.port, 0);
        assert!(config.validate().is_ok(), "Port 0 should be allowed in testing environment");
    }

    #[test]
    fn test_port_validation_in_development_environment() {
        let mut config = AppConfig::new();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_database() {
        let mut config = AppConfig::production();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { ref field, .. }) if field == "database_url"
        ));

        config.database_url = Some("postgres://localhost/app".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::new();
        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("PORT", "4000");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("LOG_FORMAT", "json");
        env::set_var("DATABASE_URL", "postgres://localhost/users");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.has_database());
        assert!(config.config_sources()["port"].is_env_var());
        assert!(config.config_sources()["log_level"].is_default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        clear_env();
        env::set_var("PORT", "not-a-port");

        let err = AppConfig::from_env().unwrap_err();
        assert_eq!(err.field(), Some("port"));

        clear_env();
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Test".parse::<Environment>().unwrap(), Environment::Testing);
        assert!("staging".parse::<Environment>().is_err());
    }
}

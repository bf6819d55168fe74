//! Structured logging setup
//!
//! One `tracing-subscriber` registry per process with an `EnvFilter` and a
//! pretty, JSON or plain formatting layer. `RUST_LOG` overrides the
//! configured filter when set.

use latchkey_core::{AppConfig, Environment, LogFormat};
use serde_json::json;
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level used when no filter is given (e.g. "info")
    pub level: String,
    pub format: LogFormat,
    /// Include file and line number information
    pub include_location: bool,
    /// Directive string such as "latchkey_auth=debug,tower_http=info"
    pub env_filter: Option<String>,
    pub service_name: Option<String>,
    pub service_version: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            env_filter: None,
            service_name: None,
            service_version: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            env_filter: Some("latchkey=info,latchkey_auth=info,latchkey_http=info,tower_http=warn,axum=warn".to_string()),
            ..Self::default()
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            include_location: true,
            env_filter: Some(
                "latchkey=debug,latchkey_auth=debug,latchkey_http=debug,tower_http=debug,sqlx=warn".to_string(),
            ),
            ..Self::default()
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            format: LogFormat::Plain,
            env_filter: Some("latchkey_auth=error,latchkey_http=error".to_string()),
            ..Self::default()
        }
    }

    /// Pick the preset for the process environment, then apply its level and format.
    ///
    /// latchkey's own crates log at the configured level; other targets keep
    /// their preset level but never log more than it.
    pub fn from_app_config(app: &AppConfig) -> Self {
        let preset = match app.environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::test(),
            Environment::Production => Self::production(),
        };
        let env_filter = preset
            .env_filter
            .as_deref()
            .map(|directives| directives_at_level(directives, &app.log_level));
        Self {
            level: app.log_level.clone(),
            format: app.log_format,
            env_filter,
            ..preset
        }
    }

    /// Set service name and version
    pub fn with_service(mut self, name: &str, version: &str) -> Self {
        self.service_name = Some(name.to_string());
        self.service_version = Some(version.to_string());
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        match &self.env_filter {
            // The level applies to everything the directives don't name
            Some(directives) => EnvFilter::try_new(format!("{},{}", self.level, directives)),
            None => EnvFilter::try_new(&self.level),
        }
    }
}

fn directives_at_level(directives: &str, level: &str) -> String {
    let Ok(cap) = level.parse::<LevelFilter>() else {
        return directives.to_string();
    };

    directives
        .split(',')
        .filter_map(|directive| {
            let (target, preset) = directive.split_once('=')?;
            let level = if target.starts_with("latchkey") {
                cap
            } else {
                preset.parse::<LevelFilter>().map_or(cap, |preset| preset.min(cap))
            };
            Some(format!("{}={}", target, level.to_string().to_lowercase()))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize structured logging for the process.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.filter()?;

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                Layer::new()
                    .with_writer(io::stdout)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .json(),
            )
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                Layer::new()
                    .with_writer(io::stdout)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout))
            .try_init()?,
    }

    tracing::info!(
        target: "latchkey::logging",
        level = %config.level,
        format = ?config.format,
        service = config.service_name.as_deref().unwrap_or(latchkey_core::SERVICE_NAME),
        version = config.service_version.as_deref().unwrap_or(latchkey_core::VERSION),
        "Structured logging initialized"
    );

    Ok(())
}

/// Log application startup
pub fn log_startup_info(service_name: &str, service_version: &str, bind_address: &str) {
    let startup_info = json!({
        "event": "application_startup",
        "service": service_name,
        "version": service_version,
        "address": bind_address,
        "pid": std::process::id(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    tracing::info!(target: "latchkey::startup", "{}", startup_info);
}

/// Log application shutdown
pub fn log_shutdown_info(service_name: &str) {
    let shutdown_info = json!({
        "event": "application_shutdown",
        "service": service_name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    tracing::info!(target: "latchkey::shutdown", "{}", shutdown_info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_presets() {
        assert_eq!(LoggingConfig::production().format, LogFormat::Json);
        assert_eq!(LoggingConfig::development().level, "debug");
        assert_eq!(LoggingConfig::test().level, "error");
    }

    #[test]
    fn test_from_app_config_keeps_level_and_format() {
        let app = AppConfig {
            log_level: "warn".to_string(),
            log_format: LogFormat::Json,
            ..AppConfig::production()
        };
        let config = LoggingConfig::from_app_config(&app);

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.env_filter.unwrap().contains("tower_http=warn"));
    }

    fn max_level(config: &LoggingConfig) -> Option<LevelFilter> {
        let filter = config.filter().unwrap();
        <EnvFilter as tracing_subscriber::Layer<tracing_subscriber::Registry>>::max_level_hint(&filter)
    }

    #[test]
    #[serial]
    fn test_log_level_caps_development_preset() {
        std::env::remove_var("RUST_LOG");
        let app = AppConfig {
            log_level: "warn".to_string(),
            ..AppConfig::new()
        };
        let config = LoggingConfig::from_app_config(&app);

        assert_eq!(max_level(&config), Some(LevelFilter::WARN));
        let directives = config.env_filter.unwrap();
        assert!(directives.contains("latchkey_auth=warn"));
        assert!(directives.contains("tower_http=warn"));
    }

    #[test]
    #[serial]
    fn test_log_level_raises_own_crates_in_production() {
        std::env::remove_var("RUST_LOG");
        let app = AppConfig {
            log_level: "debug".to_string(),
            ..AppConfig::production()
        };
        let config = LoggingConfig::from_app_config(&app);

        assert_eq!(max_level(&config), Some(LevelFilter::DEBUG));
        let directives = config.env_filter.unwrap();
        assert!(directives.contains("latchkey_auth=debug"));
        assert!(directives.contains("tower_http=warn"));
    }

    #[test]
    fn test_filter_parses() {
        let config = LoggingConfig::development().with_env_filter("latchkey_http=trace");
        assert!(config.filter().is_ok());
    }
}

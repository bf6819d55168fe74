//! # latchkey-core
//!
//! Configuration foundation shared by the latchkey crates: the
//! [`AppConfigTrait`] loading contract, the process-level [`AppConfig`] and
//! the [`ConfigError`] every loader reports.

pub mod config;

pub use config::validation::ConfigError;
pub use config::{parse_env, AppConfig, AppConfigTrait, ConfigSource, Environment, LogFormat};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs and the CLI banner
pub const SERVICE_NAME: &str = "latchkey";

//! Authentication configuration types and utilities
//!
//! [`AuthConfig`] is plain data. It is loaded once at startup (usually with
//! [`AppConfigTrait::from_env`]) and handed to
//! [`AuthOptions`](crate::AuthOptions), which owns it for the life of the
//! process.

use latchkey_core::{parse_env, AppConfigTrait, ConfigError, ConfigSource};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Minimum accepted length of the signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

static SQL_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid identifier pattern")
});

/// Process-wide secret used to sign session tokens and CSRF hashes
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HS256)
    #[serde(default)]
    pub secret: Secret,

    /// Public base URL of the application, used to resolve callback URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Custom pages the framework redirects to
    #[serde(default)]
    pub pages: PagesConfig,

    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,

    /// Mapping of the users table read by the Postgres store
    #[serde(default)]
    pub users: UserTableConfig,

    /// Cookie attributes
    #[serde(default)]
    pub cookies: CookieConfig,
}

/// How sessions are persisted between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStrategy {
    /// Signed token carried in a cookie; no server-side session store
    #[default]
    Jwt,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub strategy: SessionStrategy,

    /// Token validity window in seconds, counted from issuance
    #[serde(default = "default_session_max_age")]
    pub max_age: u64,
}

/// Application routes used instead of built-in pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    #[serde(default = "default_page")]
    pub sign_in: String,

    #[serde(default = "default_page")]
    pub error: String,
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Password hashing algorithm (bcrypt, argon2)
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    /// Bcrypt cost factor (if using bcrypt)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Argon2 memory cost in KB (if using argon2)
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory: u32,

    /// Argon2 time cost (iterations)
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism factor
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

/// Where user records live in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTableConfig {
    #[serde(default = "default_users_table")]
    pub table: String,

    #[serde(default = "default_id_column")]
    pub id_column: String,

    #[serde(default = "default_email_column")]
    pub email_column: String,

    /// Column holding the password hash
    #[serde(default = "default_password_column")]
    pub password_column: String,
}

/// Cookie attributes shared by the session and CSRF cookies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Force the Secure flag; `None` derives it from the base URL scheme
    #[serde(default)]
    pub secure: Option<bool>,

    /// SameSite policy (Strict, Lax, None)
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_session_max_age() -> u64 {
    30 * 24 * 60 * 60
} // 30 days
fn default_page() -> String {
    "/login".to_string()
}
fn default_hash_algorithm() -> String {
    "bcrypt".to_string()
}
fn default_bcrypt_cost() -> u32 {
    12
}
fn default_argon2_memory() -> u32 {
    65536
} // 64MB
fn default_argon2_iterations() -> u32 {
    3
}
fn default_argon2_parallelism() -> u32 {
    4
}
fn default_users_table() -> String {
    "users".to_string()
}
fn default_id_column() -> String {
    "id".to_string()
}
fn default_email_column() -> String {
    "email".to_string()
}
fn default_password_column() -> String {
    "password".to_string()
}
fn default_same_site() -> String {
    "Lax".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: SessionStrategy::default(),
            max_age: default_session_max_age(),
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            sign_in: default_page(),
            error: default_page(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: default_hash_algorithm(),
            bcrypt_cost: default_bcrypt_cost(),
            argon2_memory: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl PasswordConfig {
    /// Cheap hashing parameters for development and tests
    pub fn development() -> Self {
        Self {
            bcrypt_cost: 4,
            argon2_memory: 4096,
            argon2_iterations: 2,
            argon2_parallelism: 1,
            ..Self::default()
        }
    }
}

impl Default for UserTableConfig {
    fn default() -> Self {
        Self {
            table: default_users_table(),
            id_column: default_id_column(),
            email_column: default_email_column(),
            password_column: default_password_column(),
        }
    }
}

impl UserTableConfig {
    /// Check every name is a plain SQL identifier, since they are spliced into queries
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, identifier) in [
            ("users.table", &self.table),
            ("users.id_column", &self.id_column),
            ("users.email_column", &self.email_column),
            ("users.password_column", &self.password_column),
        ] {
            if !SQL_IDENTIFIER.is_match(identifier) {
                return Err(ConfigError::invalid_value(field, identifier.clone(), "SQL identifier"));
            }
        }
        Ok(())
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: None,
            same_site: default_same_site(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: Secret::default(),
            base_url: default_base_url(),
            session: SessionConfig::default(),
            pages: PagesConfig::default(),
            password: PasswordConfig::default(),
            users: UserTableConfig::default(),
            cookies: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Create a configuration with the given signing secret and defaults elsewhere
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret),
            ..Self::default()
        }
    }

    /// Create a development configuration with fast password hashing
    pub fn development(secret: impl Into<String>) -> Self {
        Self {
            password: PasswordConfig::development(),
            ..Self::with_secret(secret)
        }
    }

    /// Whether cookies carry the Secure flag (and the `__Secure-`/`__Host-` prefixes)
    pub fn use_secure_cookies(&self) -> bool {
        self.cookies
            .secure
            .unwrap_or_else(|| self.base_url.starts_with("https://"))
    }
}

impl AppConfigTrait for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.secret = env::var("AUTH_SECRET").map(Secret::new).map_err(|_| {
            ConfigError::missing_required(
                "secret",
                "AUTH_SECRET environment variable is required to sign session tokens",
            )
        })?;

        if let Ok(base_url) = env::var("AUTH_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(max_age) = parse_env::<u64>("AUTH_SESSION_MAX_AGE", "session.max_age", "number of seconds")? {
            config.session.max_age = max_age;
        }
        if let Ok(page) = env::var("AUTH_SIGNIN_PAGE") {
            config.pages.sign_in = page;
        }
        if let Ok(page) = env::var("AUTH_ERROR_PAGE") {
            config.pages.error = page;
        }
        if let Ok(algorithm) = env::var("AUTH_HASH_ALGORITHM") {
            config.password.hash_algorithm = algorithm.to_lowercase();
        }
        if let Some(cost) = parse_env::<u32>("AUTH_BCRYPT_COST", "password.bcrypt_cost", "bcrypt cost between 4 and 31")? {
            config.password.bcrypt_cost = cost;
        }
        if let Ok(table) = env::var("AUTH_USERS_TABLE") {
            config.users.table = table;
        }
        if let Some(secure) = parse_env::<bool>("AUTH_COOKIE_SECURE", "cookies.secure", "true or false")? {
            config.cookies.secure = Some(secure);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::missing_required(
                "secret",
                "AUTH_SECRET environment variable is required to sign session tokens",
            ));
        }
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::invalid_value(
                "secret",
                "***",
                format!("at least {} characters", MIN_SECRET_LENGTH),
            ));
        }

        let base_url = url::Url::parse(&self.base_url).map_err(|_| {
            ConfigError::invalid_value("base_url", self.base_url.clone(), "absolute http(s) URL")
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.host().is_none() {
            return Err(ConfigError::invalid_value(
                "base_url",
                self.base_url.clone(),
                "absolute http(s) URL",
            ));
        }

        if self.session.max_age == 0 {
            return Err(ConfigError::invalid_value("session.max_age", "0", "positive number of seconds"));
        }

        for (field, page) in [("pages.sign_in", &self.pages.sign_in), ("pages.error", &self.pages.error)] {
            if !page.starts_with('/') || page.starts_with("//") {
                return Err(ConfigError::invalid_value(field, page.clone(), "application path starting with '/'"));
            }
        }

        if !["bcrypt", "argon2"].contains(&self.password.hash_algorithm.as_str()) {
            return Err(ConfigError::invalid_value(
                "password.hash_algorithm",
                self.password.hash_algorithm.clone(),
                "bcrypt or argon2",
            ));
        }
        if !(4..=31).contains(&self.password.bcrypt_cost) {
            return Err(ConfigError::invalid_value(
                "password.bcrypt_cost",
                self.password.bcrypt_cost.to_string(),
                "bcrypt cost between 4 and 31",
            ));
        }

        self.users.validate()?;

        if !["Strict", "Lax", "None"].contains(&self.cookies.same_site.as_str()) {
            return Err(ConfigError::invalid_value(
                "cookies.same_site",
                self.cookies.same_site.clone(),
                "Strict, Lax or None",
            ));
        }
        if self.cookies.same_site == "None" && !self.use_secure_cookies() {
            return Err(ConfigError::validation_failed(
                "SameSite=None cookies must be Secure; serve over https or set AUTH_COOKIE_SECURE=true",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("secret".to_string(), ConfigSource::for_env("AUTH_SECRET", "none"));
        sources.insert("base_url".to_string(), ConfigSource::for_env("AUTH_URL", default_base_url()));
        sources.insert(
            "session.max_age".to_string(),
            ConfigSource::for_env("AUTH_SESSION_MAX_AGE", default_session_max_age().to_string()),
        );
        sources.insert("pages.sign_in".to_string(), ConfigSource::for_env("AUTH_SIGNIN_PAGE", default_page()));
        sources.insert("pages.error".to_string(), ConfigSource::for_env("AUTH_ERROR_PAGE", default_page()));
        sources.insert(
            "password.hash_algorithm".to_string(),
            ConfigSource::for_env("AUTH_HASH_ALGORITHM", default_hash_algorithm()),
        );
        sources.insert("users.table".to_string(), ConfigSource::for_env("AUTH_USERS_TABLE", default_users_table()));
        sources
    }
}

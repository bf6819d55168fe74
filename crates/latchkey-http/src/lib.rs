//! # latchkey-http
//!
//! The HTTP side of latchkey: one catch-all endpoint at `/api/auth/*action`
//! that serves the session, CSRF, provider, sign-in and sign-out actions on
//! top of [`latchkey_auth::AuthOptions`], plus request limits, structured
//! logging and graceful shutdown.

pub mod auth;
pub mod config;
pub mod errors;
pub mod logging;
pub mod routing;
pub mod server;

pub use auth::{AuthHandler, AuthRequest, CookieSettings};
pub use config::{HttpConfig, HttpDefaults};
pub use errors::{HttpError, HttpResult};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use routing::{auth_router, AUTH_ROUTE};
pub use server::{build_app, serve, serve_with_shutdown};

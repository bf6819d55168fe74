//! Auth actions served under `/api/auth`

pub mod actions;
pub mod body;
pub mod cookies;
pub mod csrf;
pub mod handler;
pub mod redirect;

pub use actions::AuthAction;
pub use cookies::CookieSettings;
pub use csrf::CsrfProtection;
pub use handler::{AuthHandler, AuthRequest};
pub use redirect::Redirects;

//! Action names served under `/api/auth`

use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Session,
    Csrf,
    Providers,
    SignInPage,
    CredentialsCallback,
    SignOutPage,
    SignOut,
    ErrorPage,
}

impl AuthAction {
    /// Resolve the path below `/api/auth/` for `method`
    pub fn parse(method: &Method, action: &str) -> Option<Self> {
        let action = action.trim_matches('/');
        let action = match (method, action) {
            (&Method::GET, "session") => Self::Session,
            (&Method::GET, "csrf") => Self::Csrf,
            (&Method::GET, "providers") => Self::Providers,
            (&Method::GET, "signin") => Self::SignInPage,
            (&Method::POST, "signin/credentials") | (&Method::POST, "callback/credentials") => {
                Self::CredentialsCallback
            }
            (&Method::GET, "signout") => Self::SignOutPage,
            (&Method::POST, "signout") => Self::SignOut,
            (&Method::GET, "error") => Self::ErrorPage,
            _ => return None,
        };
        Some(action)
    }
}

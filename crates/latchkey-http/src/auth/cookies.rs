//! Session and CSRF cookie attributes

use axum_extra::extract::cookie::{Cookie, SameSite};
use latchkey_auth::AuthConfig;

const SESSION_COOKIE: &str = "latchkey.session-token";
const CSRF_COOKIE: &str = "latchkey.csrf-token";

/// Cookie names and attributes derived once from [`AuthConfig`]
#[derive(Debug, Clone)]
pub struct CookieSettings {
    session_name: String,
    csrf_name: String,
    secure: bool,
    same_site: SameSite,
    max_age: u64,
}

impl CookieSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        let secure = config.use_secure_cookies();
        let (session_name, csrf_name) = if secure {
            (format!("__Secure-{}", SESSION_COOKIE), format!("__Host-{}", CSRF_COOKIE))
        } else {
            (SESSION_COOKIE.to_string(), CSRF_COOKIE.to_string())
        };

        Self {
            session_name,
            csrf_name,
            secure,
            same_site: parse_same_site(&config.cookies.same_site),
            max_age: config.session.max_age,
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn csrf_name(&self) -> &str {
        &self.csrf_name
    }

    /// Session cookie carrying a signed token, expiring with it
    pub fn session_cookie(&self, value: String) -> Cookie<'static> {
        let max_age = time::Duration::seconds(i64::try_from(self.max_age).unwrap_or(i64::MAX));
        let mut cookie = self.base(self.session_name.clone(), value);
        cookie.set_max_age(max_age);
        cookie
    }

    /// CSRF cookie; lives for the browser session
    pub fn csrf_cookie(&self, value: String) -> Cookie<'static> {
        self.base(self.csrf_name.clone(), value)
    }

    /// Expired, empty cookie that makes the browser drop `name`
    pub fn removal(&self, name: &str) -> Cookie<'static> {
        let mut cookie = self.base(name.to_string(), String::new());
        cookie.make_removal();
        cookie
    }

    fn base(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .build()
    }
}

fn parse_same_site(value: &str) -> SameSite {
    match value {
        "Strict" => SameSite::Strict,
        "None" => SameSite::None,
        _ => SameSite::Lax,
    }
}

//! The auth endpoint
//!
//! [`AuthHandler`] owns the immutable [`AuthOptions`] plus the derived
//! cookie, CSRF and redirect settings, and serves every action below
//! `/api/auth`.

use super::actions::AuthAction;
use super::body::AuthForm;
use super::cookies::CookieSettings;
use super::csrf::CsrfProtection;
use super::redirect::Redirects;
use crate::errors::{HttpError, HttpResult};
use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use latchkey_auth::AuthOptions;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const CREDENTIALS_SIGNIN: &str = "CredentialsSignin";
const NO_STORE: &str = "private, no-cache, no-store";

/// Framework entry point for the auth endpoint
#[derive(Clone)]
pub struct AuthHandler {
    inner: Arc<HandlerInner>,
}

struct HandlerInner {
    options: Arc<AuthOptions>,
    cookies: CookieSettings,
    csrf: CsrfProtection,
    redirects: Redirects,
}

/// Everything an action may read from the request
pub struct AuthRequest {
    pub method: Method,
    pub action: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub jar: CookieJar,
    pub body: Bytes,
}

impl AuthHandler {
    pub fn new(options: Arc<AuthOptions>) -> HttpResult<Self> {
        let config = options.config();
        let base = Url::parse(&config.base_url)
            .map_err(|e| HttpError::config(format!("invalid base URL {}: {}", config.base_url, e)))?;

        Ok(Self {
            inner: Arc::new(HandlerInner {
                cookies: CookieSettings::from_config(config),
                csrf: CsrfProtection::new(config.secret.clone()),
                redirects: Redirects::new(base),
                options,
            }),
        })
    }

    pub fn options(&self) -> &AuthOptions {
        &self.inner.options
    }

    /// Dispatch one request to its action
    pub async fn handle(&self, request: AuthRequest) -> Response {
        let Some(action) = AuthAction::parse(&request.method, &request.action) else {
            debug!(method = %request.method, action = %request.action, "Unknown auth action");
            return HttpError::unknown_action(request.action).into_response();
        };

        let result = match action {
            AuthAction::Session => Ok(self.session(request.jar)),
            AuthAction::Csrf => Ok(self.csrf(request.jar)),
            AuthAction::Providers => Ok(self.providers()),
            AuthAction::SignInPage => Ok(self.sign_in_page(&request.query)),
            AuthAction::CredentialsCallback => self.credentials_callback(request).await,
            AuthAction::SignOutPage => Ok(redirect(self.sign_in_url(&[]))),
            AuthAction::SignOut => self.sign_out(request),
            AuthAction::ErrorPage => Ok(self.error_page(&request.query)),
        };

        result.unwrap_or_else(IntoResponse::into_response)
    }

    fn session(&self, jar: CookieJar) -> Response {
        let inner = &self.inner;
        let Some(cookie) = jar.get(inner.cookies.session_name()) else {
            return ([(header::CACHE_CONTROL, NO_STORE)], Json(json!({}))).into_response();
        };

        match inner.options.read_session(cookie.value()) {
            Ok(session) => ([(header::CACHE_CONTROL, NO_STORE)], Json(session)).into_response(),
            Err(e) => {
                debug!(error = %e, "Discarding invalid session cookie");
                let jar = jar.add(inner.cookies.removal(inner.cookies.session_name()));
                (jar, [(header::CACHE_CONTROL, NO_STORE)], Json(json!({}))).into_response()
            }
        }
    }

    fn csrf(&self, jar: CookieJar) -> Response {
        let inner = &self.inner;
        let existing = jar
            .get(inner.cookies.csrf_name())
            .and_then(|cookie| inner.csrf.token_from_cookie(cookie.value()).map(str::to_owned));

        match existing {
            Some(token) => Json(json!({ "csrfToken": token })).into_response(),
            None => {
                let (token, value) = inner.csrf.issue();
                let jar = jar.add(inner.cookies.csrf_cookie(value));
                (jar, Json(json!({ "csrfToken": token }))).into_response()
            }
        }
    }

    fn providers(&self) -> Response {
        let inner = &self.inner;
        let provider = inner.options.provider();

        let mut providers = Map::new();
        providers.insert(
            provider.id.clone(),
            json!({
                "id": provider.id,
                "name": provider.name,
                "type": provider.provider_type(),
                "signinUrl": inner.redirects.action(&format!("signin/{}", provider.id)),
                "callbackUrl": inner.redirects.action(&format!("callback/{}", provider.id)),
            }),
        );
        Json(Value::Object(providers)).into_response()
    }

    fn sign_in_page(&self, query: &HashMap<String, String>) -> Response {
        let callback = self.inner.redirects.callback(query.get("callbackUrl").map(String::as_str));
        redirect(self.sign_in_url(&[("callbackUrl", callback.as_str())]))
    }

    async fn credentials_callback(&self, request: AuthRequest) -> HttpResult<Response> {
        let inner = &self.inner;
        let form = AuthForm::parse(&request.headers, &request.body)?;
        let wants_json = form.wants_json();

        if !self.csrf_matches(&request.jar, &form) {
            warn!("CSRF token mismatch on credentials sign-in");
            return Ok(reply(wants_json, StatusCode::FORBIDDEN, self.sign_in_url(&[("csrf", "true")])));
        }

        let callback = inner.redirects.callback(
            form.callback_url
                .as_deref()
                .or_else(|| request.query.get("callbackUrl").map(String::as_str)),
        );

        match inner.options.verifier().verify_credentials(&form.credentials()).await {
            Ok(identity) => {
                let (signed, _) = inner.options.issue_session(&identity)?;
                info!(user_id = %identity.id, "User signed in");

                let jar = request.jar.add(inner.cookies.session_cookie(signed));
                Ok((jar, reply(wants_json, StatusCode::OK, callback)).into_response())
            }
            Err(e) if e.is_sign_in_failure() => {
                let url = inner.redirects.page(
                    &inner.options.config().pages.error,
                    &[("error", CREDENTIALS_SIGNIN), ("provider", inner.options.provider().id.as_str())],
                );
                Ok(reply(wants_json, StatusCode::UNAUTHORIZED, url))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn sign_out(&self, request: AuthRequest) -> HttpResult<Response> {
        let inner = &self.inner;
        let form = AuthForm::parse(&request.headers, &request.body)?;
        let wants_json = form.wants_json();

        if !self.csrf_matches(&request.jar, &form) {
            warn!("CSRF token mismatch on sign-out");
            return Ok(reply(wants_json, StatusCode::FORBIDDEN, self.sign_in_url(&[("csrf", "true")])));
        }

        let callback = inner.redirects.callback(
            form.callback_url
                .as_deref()
                .or_else(|| request.query.get("callbackUrl").map(String::as_str)),
        );
        let jar = request
            .jar
            .add(inner.cookies.removal(inner.cookies.session_name()));
        info!("User signed out");

        Ok((jar, reply(wants_json, StatusCode::OK, callback)).into_response())
    }

    fn error_page(&self, query: &HashMap<String, String>) -> Response {
        let params: Vec<(&str, &str)> = query
            .get("error")
            .map(|error| vec![("error", error.as_str())])
            .unwrap_or_default();
        redirect(
            self.inner
                .redirects
                .page(&self.inner.options.config().pages.error, &params),
        )
    }

    fn csrf_matches(&self, jar: &CookieJar, form: &AuthForm) -> bool {
        let cookie = jar.get(self.inner.cookies.csrf_name());
        self.inner
            .csrf
            .verify(cookie.map(|c| c.value()), form.csrf_token.as_deref())
    }

    fn sign_in_url(&self, params: &[(&str, &str)]) -> String {
        self.inner
            .redirects
            .page(&self.inner.options.config().pages.sign_in, params)
    }
}

impl std::fmt::Debug for AuthHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHandler")
            .field("options", &self.inner.options)
            .field("cookies", &self.inner.cookies)
            .field("base_url", &self.inner.redirects.base().as_str())
            .finish()
    }
}

fn redirect(url: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

/// Either `{url}` with `status` for fetch clients, or a redirect
fn reply(wants_json: bool, status: StatusCode, url: String) -> Response {
    if wants_json {
        (status, Json(json!({ "url": url }))).into_response()
    } else {
        redirect(url)
    }
}

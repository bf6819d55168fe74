//! End-to-end flows through the auth endpoint, driven with `oneshot`.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use latchkey_auth::utils::BcryptHasher;
use latchkey_auth::{AuthConfig, AuthOptions, MemoryUserStore, PasswordHasher, StoredUser};
use latchkey_http::{build_app, AuthHandler, HttpConfig};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "http-flow-secret-0123456789abcdef";
const USER_ID: &str = "9b2e7c41";
const SESSION_COOKIE: &str = "latchkey.session-token";
const CSRF_COOKIE: &str = "latchkey.csrf-token";

async fn app() -> Router {
    app_with(AuthConfig::development(SECRET)).await
}

async fn app_with(config: AuthConfig) -> Router {
    let hasher = BcryptHasher::development();
    let store = MemoryUserStore::with_users([StoredUser::new(
        USER_ID,
        "a@b.com",
        hasher.hash_password("correct").unwrap(),
    )]);

    let options = AuthOptions::builder(config)
        .store(Arc::new(store))
        .hasher(Arc::new(hasher))
        .build()
        .unwrap();
    let handler = AuthHandler::new(Arc::new(options)).unwrap();

    build_app(handler, &HttpConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` of the first Set-Cookie for `name`
fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Fetch a CSRF token; returns `(token, cookie pair)`
async fn csrf(app: &Router) -> (String, String) {
    let response = send(
        app,
        Request::get("/api/auth/csrf").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = cookie_pair(&set_cookie(&response, CSRF_COOKIE).expect("csrf cookie"));
    let token = json_body(response).await["csrfToken"].as_str().unwrap().to_string();
    (token, cookie)
}

fn form_post(uri: &str, cookie: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

async fn sign_in(app: &Router, password: &str) -> Response<Body> {
    let (token, cookie) = csrf(app).await;
    send(
        app,
        form_post(
            "/api/auth/callback/credentials",
            &cookie,
            format!(
                "csrfToken={}&email=a%40b.com&password={}&callbackUrl=%2Fdashboard",
                token, password
            ),
        ),
    )
    .await
}

#[tokio::test]
async fn successful_sign_in_exposes_user_id_on_every_read() {
    let app = app().await;

    let response = sign_in(&app, "correct").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/dashboard");

    let issued = set_cookie(&response, SESSION_COOKIE).expect("session cookie");
    assert!(issued.contains("HttpOnly"));
    assert!(issued.contains("Path=/"));
    assert!(issued.contains("Max-Age=2592000"));
    let session_cookie = cookie_pair(&issued);

    for _ in 0..3 {
        let response = send(
            &app,
            Request::get("/api/auth/session")
                .header(header::COOKIE, &session_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let session = json_body(response).await;
        assert_eq!(session["user"]["id"], USER_ID);
        assert_eq!(session["user"]["email"], "a@b.com");
        assert!(session["expires"].is_string());
    }
}

#[tokio::test]
async fn wrong_password_redirects_to_error_page_without_cookie() {
    let app = app().await;

    let response = sign_in(&app, "wrong").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "http://localhost:3000/login?error=CredentialsSignin&provider=credentials"
    );
    assert!(set_cookie(&response, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn unknown_email_gets_the_same_outcome_as_wrong_password() {
    let app = app().await;
    let (token, cookie) = csrf(&app).await;

    let response = send(
        &app,
        form_post(
            "/api/auth/signin/credentials",
            &cookie,
            format!("csrfToken={}&email=nobody%40b.com&password=correct", token),
        ),
    )
    .await;

    assert_eq!(
        location(&response),
        "http://localhost:3000/login?error=CredentialsSignin&provider=credentials"
    );
    assert!(set_cookie(&response, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn json_clients_get_url_replies() {
    let app = app().await;
    let (token, cookie) = csrf(&app).await;

    let request = |password: &str| {
        Request::post("/api/auth/callback/credentials")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &cookie)
            .body(Body::from(
                serde_json::json!({
                    "csrfToken": token,
                    "email": "a@b.com",
                    "password": password,
                    "json": true,
                })
                .to_string(),
            ))
            .unwrap()
    };

    let ok = send(&app, request("correct")).await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert!(set_cookie(&ok, SESSION_COOKIE).is_some());
    assert_eq!(json_body(ok).await["url"], "http://localhost:3000/");

    let rejected = send(&app, request("wrong")).await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(rejected).await["url"],
        "http://localhost:3000/login?error=CredentialsSignin&provider=credentials"
    );
}

#[tokio::test]
async fn missing_csrf_token_is_rejected() {
    let app = app().await;
    let (_, cookie) = csrf(&app).await;

    let response = send(
        &app,
        form_post(
            "/api/auth/callback/credentials",
            &cookie,
            "email=a%40b.com&password=correct".to_string(),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/login?csrf=true");
    assert!(set_cookie(&response, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn csrf_cookie_is_reused_while_valid() {
    let app = app().await;
    let (token, cookie) = csrf(&app).await;

    let response = send(
        &app,
        Request::get("/api/auth/csrf")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert!(set_cookie(&response, CSRF_COOKIE).is_none());
    assert_eq!(json_body(response).await["csrfToken"], token.as_str());
}

#[tokio::test]
async fn session_without_cookie_is_empty() {
    let app = app().await;
    let response = send(
        &app,
        Request::get("/api/auth/session").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({}));
}

#[tokio::test]
async fn invalid_session_cookie_is_cleared() {
    let app = app().await;
    let response = send(
        &app,
        Request::get("/api/auth/session")
            .header(header::COOKIE, format!("{}=not-a-token", SESSION_COOKIE))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    let cleared = set_cookie(&response, SESSION_COOKIE).expect("removal cookie");
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(json_body(response).await, serde_json::json!({}));
}

#[tokio::test]
async fn sign_out_clears_the_session_cookie() {
    let app = app().await;
    let (token, cookie) = csrf(&app).await;

    let response = send(
        &app,
        form_post(
            "/api/auth/signout",
            &cookie,
            format!("csrfToken={}&callbackUrl=%2Fbye", token),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/bye");
    let cleared = set_cookie(&response, SESSION_COOKIE).expect("removal cookie");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn sign_out_without_csrf_token_keeps_the_session() {
    let app = app().await;
    let signed_in = sign_in(&app, "correct").await;
    let session_cookie = cookie_pair(&set_cookie(&signed_in, SESSION_COOKIE).expect("session cookie"));
    let (_, csrf_cookie) = csrf(&app).await;

    for body in ["callbackUrl=%2Fbye", "csrfToken=forged&callbackUrl=%2Fbye"] {
        let response = send(
            &app,
            form_post(
                "/api/auth/signout",
                &format!("{}; {}", csrf_cookie, session_cookie),
                body.to_string(),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "http://localhost:3000/login?csrf=true");
        assert!(set_cookie(&response, SESSION_COOKIE).is_none());
    }

    let response = send(
        &app,
        Request::get("/api/auth/session")
            .header(header::COOKIE, &session_cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(json_body(response).await["user"]["id"], USER_ID);
}

#[tokio::test]
async fn failures_go_to_their_own_configured_pages() {
    let mut config = AuthConfig::development(SECRET);
    config.pages.sign_in = "/auth/signin".to_string();
    config.pages.error = "/auth/error".to_string();
    let app = app_with(config).await;

    let wrong_password = sign_in(&app, "wrong").await;
    assert_eq!(
        location(&wrong_password),
        "http://localhost:3000/auth/error?error=CredentialsSignin&provider=credentials"
    );

    let (token, cookie) = csrf(&app).await;
    let unknown_email = send(
        &app,
        form_post(
            "/api/auth/callback/credentials",
            &cookie,
            format!("csrfToken={}&email=nobody%40b.com&password=correct", token),
        ),
    )
    .await;
    assert_eq!(
        location(&unknown_email),
        "http://localhost:3000/auth/error?error=CredentialsSignin&provider=credentials"
    );

    let mismatch = send(
        &app,
        form_post(
            "/api/auth/callback/credentials",
            &cookie,
            "csrfToken=forged&email=a%40b.com&password=correct".to_string(),
        ),
    )
    .await;
    assert_eq!(location(&mismatch), "http://localhost:3000/auth/signin?csrf=true");

    let error_page = send(
        &app,
        Request::get("/api/auth/error?error=Configuration")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(location(&error_page), "http://localhost:3000/auth/error?error=Configuration");
}

#[tokio::test]
async fn page_actions_redirect_to_configured_pages() {
    let app = app().await;

    let signin = send(
        &app,
        Request::get("/api/auth/signin?callbackUrl=%2Fprofile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(
        location(&signin),
        "http://localhost:3000/login?callbackUrl=http%3A%2F%2Flocalhost%3A3000%2Fprofile"
    );

    let signout = send(&app, Request::get("/api/auth/signout").body(Body::empty()).unwrap()).await;
    assert_eq!(location(&signout), "http://localhost:3000/login");

    let error = send(
        &app,
        Request::get("/api/auth/error?error=Configuration")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(location(&error), "http://localhost:3000/login?error=Configuration");
}

#[tokio::test]
async fn providers_lists_credentials() {
    let app = app().await;
    let response = send(&app, Request::get("/api/auth/providers").body(Body::empty()).unwrap()).await;

    let providers = json_body(response).await;
    assert_eq!(providers["credentials"]["type"], "credentials");
    assert_eq!(
        providers["credentials"]["callbackUrl"],
        "http://localhost:3000/api/auth/callback/credentials"
    );
}

#[tokio::test]
async fn unknown_action_is_bad_request() {
    let app = app().await;
    let response = send(&app, Request::get("/api/auth/teleport").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "UNKNOWN_ACTION");
}

#[tokio::test]
async fn health_check_responds() {
    let app = app().await;
    let response = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn server_stops_on_shutdown_signal() {
    let app = app().await;
    tokio_test::assert_ok!(latchkey_http::serve_with_shutdown("127.0.0.1:0", app, async {}).await);
}

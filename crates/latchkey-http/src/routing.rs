//! The auth route

use crate::auth::{AuthHandler, AuthRequest};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;

/// Catch-all path of the auth endpoint
pub const AUTH_ROUTE: &str = "/api/auth/*action";

/// Bind `handler` to GET and POST on [`AUTH_ROUTE`]
pub fn auth_router(handler: AuthHandler) -> Router {
    Router::new()
        .route(AUTH_ROUTE, get(auth_endpoint).post(auth_endpoint))
        .with_state(handler)
}

async fn auth_endpoint(
    State(handler): State<AuthHandler>,
    method: Method,
    Path(action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handler
        .handle(AuthRequest {
            method,
            action,
            query,
            headers,
            jar,
            body,
        })
        .await
}

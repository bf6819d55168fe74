//! Request body parsing for the POST actions

use crate::errors::{HttpError, HttpResult};
use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use latchkey_auth::Credentials;
use serde::Deserialize;

/// Fields the auth actions read from a form or JSON body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthForm {
    pub csrf_token: Option<String>,
    pub callback_url: Option<String>,
    #[serde(default)]
    json: Option<Flag>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A boolean that arrives as `true` in JSON or as `"true"` in a form
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl AuthForm {
    /// Parse `body` according to its content type. An empty body yields
    /// an empty form.
    pub fn parse(headers: &HeaderMap, body: &Bytes) -> HttpResult<Self> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            serde_json::from_slice(body)
                .map_err(|e| HttpError::bad_request(format!("invalid JSON body: {}", e)))
        } else {
            serde_urlencoded::from_bytes(body)
                .map_err(|e| HttpError::bad_request(format!("invalid form body: {}", e)))
        }
    }

    /// Whether the client asked for a JSON `{url}` reply instead of a redirect
    pub fn wants_json(&self) -> bool {
        match &self.json {
            Some(Flag::Bool(flag)) => *flag,
            Some(Flag::Text(text)) => text == "true",
            None => false,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

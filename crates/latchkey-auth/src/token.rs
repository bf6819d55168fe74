//! Session tokens.
//!
//! A [`SessionToken`] is the claims set carried in the session cookie. It is
//! signed (HS256) with the process-wide secret by a [`TokenCodec`]; nothing
//! about the session is stored server-side.

use crate::config::{AuthConfig, Secret};
use crate::{AuthError, AuthResult, Identity};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by the session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Subject: id of the signed-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User id added by the issuance hook and never changed afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Issued-at, unix seconds
    pub iat: i64,

    /// Expiry, unix seconds
    pub exp: i64,

    /// Unique token id
    pub jti: String,

    /// Extra claims set by custom hooks
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionToken {
    /// Build the base claims for a freshly verified identity.
    ///
    /// The `id` claim is left unset; the issuance hook decides what to add.
    pub fn for_identity(identity: &Identity, max_age: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: Some(identity.id.clone()),
            email: Some(identity.email.clone()),
            name: None,
            id: None,
            iat: now,
            exp: now.saturating_add(i64::try_from(max_age).unwrap_or(i64::MAX)),
            jti: uuid::Uuid::new_v4().to_string(),
            extra: Map::new(),
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Check if the token is past its validity window
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs and verifies session tokens with the configured secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age: u64,
}

impl TokenCodec {
    /// Create a codec for `secret` issuing tokens valid for `max_age` seconds
    pub fn new(secret: &Secret, max_age: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.expose().as_bytes()),
            validation,
            max_age,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret, config.session.max_age)
    }

    /// Base claims for `identity`, expiring after this codec's window
    pub fn claims_for(&self, identity: &Identity) -> SessionToken {
        SessionToken::for_identity(identity, self.max_age)
    }

    /// Sign a token
    pub fn encode(&self, token: &SessionToken) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), token, &self.encoding_key).map_err(AuthError::from)
    }

    /// Verify the signature and expiry of `raw` and return its claims
    pub fn decode(&self, raw: &str) -> AuthResult<SessionToken> {
        if raw.is_empty() {
            return Err(AuthError::token_error("empty session token"));
        }
        let data = decode::<SessionToken>(raw, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

//! Double-submit CSRF tokens
//!
//! The cookie holds `token|hash` where `hash = hex(sha256(token + secret))`.
//! A mutating request must echo `token` in its body; the hash proves the
//! cookie was minted by this server.

use latchkey_auth::{CryptoUtils, Secret};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct CsrfProtection {
    secret: Secret,
}

impl CsrfProtection {
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Mint a token; returns `(token, cookie_value)`
    pub fn issue(&self) -> (String, String) {
        let token = CryptoUtils::generate_token(32);
        let cookie = format!("{}|{}", token, self.hash(&token));
        (token, cookie)
    }

    fn hash(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update(self.secret.expose().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// The token inside a cookie value, if the cookie was minted with our secret
    pub fn token_from_cookie<'a>(&self, cookie: &'a str) -> Option<&'a str> {
        let (token, hash) = cookie.split_once('|')?;
        if token.is_empty() || !CryptoUtils::constant_time_eq(hash, &self.hash(token)) {
            return None;
        }
        Some(token)
    }

    /// Whether `submitted` matches the token in a valid CSRF cookie
    pub fn verify(&self, cookie: Option<&str>, submitted: Option<&str>) -> bool {
        match (cookie.and_then(|value| self.token_from_cookie(value)), submitted) {
            (Some(expected), Some(submitted)) => CryptoUtils::constant_time_eq(expected, submitted),
            _ => false,
        }
    }
}

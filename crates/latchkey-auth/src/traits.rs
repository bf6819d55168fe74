//! Core authentication traits
//!
//! These are the seams between the domain and the outside world: where users
//! are stored, how passwords are compared, and the hook points the framework
//! calls while issuing and reading session tokens.

use crate::{AuthResult, Identity, SessionToken, SessionView, StoredUser};
use async_trait::async_trait;

/// Read-only access to stored user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user whose stored email equals `email` exactly
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>>;

    /// Get store name for logging
    fn store_name(&self) -> &str;
}

/// Password hasher trait for different hashing algorithms
pub trait PasswordHasher: Send + Sync {
    /// Hash a password
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    /// Get the hasher name
    fn hasher_name(&self) -> &str;
}

/// Lifecycle hooks the framework invokes around session tokens.
///
/// Both hooks must be total: they cannot fail and must be cheap, since
/// `on_read` runs on every session access. The default implementations
/// return their input unchanged.
pub trait SessionCallbacks: Send + Sync {
    /// Called when a token is issued. `identity` is present only on the
    /// issuance that immediately follows a successful sign-in.
    fn on_issue(&self, token: SessionToken, identity: Option<&Identity>) -> SessionToken {
        let _ = identity;
        token
    }

    /// Called every time the client-visible session is rebuilt from a token
    fn on_read(&self, session: SessionView, token: &SessionToken) -> SessionView {
        let _ = token;
        session
    }
}

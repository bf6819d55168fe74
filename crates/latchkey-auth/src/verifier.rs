//! Credentials verification
//!
//! [`IdentityVerifier`] is the authorization predicate of the credentials
//! provider: one read-only store lookup followed by a password comparison.
//! Unknown emails are compared against a decoy hash so both rejections cost
//! the same hashing work.

use crate::{AuthError, AuthResult, Credentials, Identity, PasswordHasher, UserStore};
use once_cell::sync::OnceCell;
use std::sync::Arc;

const DECOY_PASSWORD: &str = "latchkey-decoy-password";

/// Checks an email/password pair against the user store
#[derive(Clone)]
pub struct IdentityVerifier {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    /// Hash of [`DECOY_PASSWORD`] under the configured hasher, made on first use
    decoy_hash: Arc<OnceCell<Option<String>>>,
}

impl IdentityVerifier {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Verify `email` and `password`, returning the matching identity.
    ///
    /// Email matching is exact; no normalisation is applied. Store faults
    /// are logged and returned as [`AuthError::LookupFailure`].
    pub async fn verify(&self, email: &str, password: &str) -> AuthResult<Identity> {
        if email.is_empty() || password.is_empty() {
            tracing::warn!(kind = "missing_credentials", "Rejected sign-in");
            return Err(AuthError::MissingCredentials);
        }

        tracing::debug!(email = %email, store = self.store.store_name(), "Looking up user");
        let user = match self.store.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.compare_with_decoy(password).await;
                tracing::warn!(email = %email, kind = "user_not_found", "Rejected sign-in");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => {
                tracing::error!(email = %email, error = %e, "User lookup failed");
                return Err(match e {
                    AuthError::LookupFailure { .. } => e,
                    other => AuthError::lookup_failure(other.to_string()),
                });
            }
        };

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::crypto_error(format!("password check aborted: {}", e)))?
            .map_err(|e| {
                tracing::error!(email = %email, error = %e, "Stored password hash is unusable");
                e
            })?;

        if !matches {
            tracing::warn!(email = %email, kind = "invalid_password", "Rejected sign-in");
            return Err(AuthError::InvalidPassword);
        }

        tracing::debug!(email = %email, user_id = %user.id, "Credentials verified");
        Ok(Identity::from(&user))
    }

    /// Verify credentials as submitted in a request body
    pub async fn verify_credentials(&self, credentials: &Credentials) -> AuthResult<Identity> {
        self.verify(
            credentials.email.as_deref().unwrap_or_default(),
            credentials.password.as_deref().unwrap_or_default(),
        )
        .await
    }

    async fn compare_with_decoy(&self, password: &str) {
        let hasher = Arc::clone(&self.hasher);
        let decoy = Arc::clone(&self.decoy_hash);
        let password = password.to_owned();

        let _ = tokio::task::spawn_blocking(move || {
            if let Some(hash) = decoy.get_or_init(|| hasher.hash_password(DECOY_PASSWORD).ok()) {
                let _ = hasher.verify_password(&password, hash);
            }
        })
        .await;
    }

    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.hasher
    }
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("store", &self.store.store_name())
            .field("hasher", &self.hasher.hasher_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BcryptHasher;
    use crate::{MemoryUserStore, StoredUser};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore;

    /// Counts password comparisons made through the wrapped hasher
    struct CountingHasher {
        inner: BcryptHasher,
        verifications: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash_password(&self, password: &str) -> AuthResult<String> {
            self.inner.hash_password(password)
        }

        fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify_password(password, hash)
        }

        fn hasher_name(&self) -> &str {
            "counting"
        }
    }

    #[async_trait]
    impl UserStore for FailingStore {
        async fn find_by_email(&self, _email: &str) -> AuthResult<Option<StoredUser>> {
            Err(AuthError::lookup_failure("connection refused"))
        }

        fn store_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_store_fault_is_lookup_failure() {
        let verifier = IdentityVerifier::new(Arc::new(FailingStore), Arc::new(BcryptHasher::development()));
        let err = verifier.verify("a@b.com", "correct").await.unwrap_err();
        assert!(matches!(err, AuthError::LookupFailure { .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_lookup() {
        let verifier = IdentityVerifier::new(Arc::new(FailingStore), Arc::new(BcryptHasher::development()));

        let err = verifier.verify_credentials(&Credentials::default()).await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }

    #[tokio::test]
    async fn test_unknown_email_still_compares_a_password() {
        let hasher = Arc::new(CountingHasher {
            inner: BcryptHasher::development(),
            verifications: AtomicUsize::new(0),
        });
        let store = MemoryUserStore::new();
        store
            .insert(StoredUser::new("1", "a@b.com", hasher.hash_password("correct").unwrap()))
            .await;
        let verifier = IdentityVerifier::new(Arc::new(store), hasher.clone());

        let err = verifier.verify("nobody@b.com", "correct").await.unwrap_err();
        assert_eq!(err, AuthError::UserNotFound);
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 1);

        let err = verifier.verify("a@b.com", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidPassword);
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 2);

        verifier.verify("nobody@b.com", "correct").await.unwrap_err();
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_stored_hash() {
        let store = MemoryUserStore::new();
        store.insert(StoredUser::new("1", "a@b.com", "plaintext")).await;
        let verifier = IdentityVerifier::new(Arc::new(store), Arc::new(BcryptHasher::development()));

        let err = verifier.verify("a@b.com", "plaintext").await.unwrap_err();
        assert!(matches!(err, AuthError::CryptographicError { .. }));
        assert!(err.is_sign_in_failure());
    }
}

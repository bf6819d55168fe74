//! Composed authentication options
//!
//! [`AuthOptions`] bundles everything the framework needs: validated
//! configuration, the credentials provider with its verifier, the session
//! hooks and the token codec. It is built once at startup and shared
//! behind an `Arc`; nothing in it changes at runtime.

use crate::{
    AuthConfig, AuthError, AuthResult, Identity, IdentityEnrichment, IdentityVerifier,
    PasswordHasher, PasswordHasherFactory, SessionCallbacks, SessionToken, SessionView,
    TokenCodec, UserStore,
};
use latchkey_core::AppConfigTrait;
use serde::Serialize;
use std::sync::Arc;

/// Describes one input of the sign-in form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialField {
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: String,
}

impl CredentialField {
    pub fn new(label: impl Into<String>, input_type: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            input_type: input_type.into(),
        }
    }
}

/// The email/password provider
#[derive(Debug, Clone)]
pub struct CredentialsProvider {
    pub id: String,
    pub name: String,
    pub fields: Vec<(String, CredentialField)>,
    verifier: IdentityVerifier,
}

impl CredentialsProvider {
    pub const ID: &'static str = "credentials";

    pub fn new(verifier: IdentityVerifier) -> Self {
        Self {
            id: Self::ID.to_string(),
            name: "Credentials".to_string(),
            fields: vec![
                ("email".to_string(), CredentialField::new("Email", "email")),
                ("password".to_string(), CredentialField::new("Password", "password")),
            ],
            verifier,
        }
    }

    /// Provider type as reported to clients
    pub fn provider_type(&self) -> &'static str {
        "credentials"
    }

    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }
}

/// Immutable authentication configuration handed to the HTTP layer
#[derive(Clone)]
pub struct AuthOptions {
    config: AuthConfig,
    provider: CredentialsProvider,
    callbacks: Arc<dyn SessionCallbacks>,
    codec: TokenCodec,
}

impl AuthOptions {
    pub fn builder(config: AuthConfig) -> AuthOptionsBuilder {
        AuthOptionsBuilder::new(config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn provider(&self) -> &CredentialsProvider {
        &self.provider
    }

    pub fn verifier(&self) -> &IdentityVerifier {
        self.provider.verifier()
    }

    pub fn callbacks(&self) -> &dyn SessionCallbacks {
        self.callbacks.as_ref()
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Build, enrich and sign the session token for a freshly verified identity
    pub fn issue_session(&self, identity: &Identity) -> AuthResult<(String, SessionToken)> {
        let claims = self.codec.claims_for(identity);
        let token = self.callbacks.on_issue(claims, Some(identity));
        let signed = self.codec.encode(&token)?;
        Ok((signed, token))
    }

    /// Decode a session cookie value and project it into the client-visible session
    pub fn read_session(&self, raw: &str) -> AuthResult<SessionView> {
        let token = self.codec.decode(raw)?;
        if token.is_expired() {
            return Err(AuthError::token_error("session token expired"));
        }
        // The issuance hook also sees every read, without an identity
        let token = self.callbacks.on_issue(token, None);
        Ok(self.session_view(&token))
    }

    /// Run the read hook over the default projection of `token`
    pub fn session_view(&self, token: &SessionToken) -> SessionView {
        self.callbacks.on_read(SessionView::from_token(token), token)
    }
}

impl std::fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOptions")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AuthOptions`]
pub struct AuthOptionsBuilder {
    config: AuthConfig,
    store: Option<Arc<dyn UserStore>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    callbacks: Option<Arc<dyn SessionCallbacks>>,
}

impl AuthOptionsBuilder {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            store: None,
            hasher: None,
            callbacks: None,
        }
    }

    /// Set the user store (required)
    pub fn store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the hasher derived from `config.password`
    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Replace the default [`IdentityEnrichment`] hooks
    pub fn callbacks(mut self, callbacks: Arc<dyn SessionCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Validate the configuration and assemble the options
    pub fn build(self) -> AuthResult<AuthOptions> {
        self.config.validate()?;

        let store = self
            .store
            .ok_or_else(|| AuthError::config_error("a user store is required"))?;
        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => PasswordHasherFactory::from_config(&self.config.password)?,
        };
        let callbacks = self
            .callbacks
            .unwrap_or_else(|| Arc::new(IdentityEnrichment));

        tracing::debug!(
            store = store.store_name(),
            hasher = hasher.hasher_name(),
            max_age = self.config.session.max_age,
            "Authentication options built"
        );

        Ok(AuthOptions {
            codec: TokenCodec::from_config(&self.config),
            provider: CredentialsProvider::new(IdentityVerifier::new(store, hasher)),
            callbacks,
            config: self.config,
        })
    }
}

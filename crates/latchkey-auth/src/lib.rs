//! # latchkey-auth: credentials authentication for latchkey
//!
//! This crate holds the domain side of the credentials login flow:
//! verifying an email/password pair against a stored hash, and the two
//! session hooks that carry the verified user id from the session token into
//! the client-visible session. It has no HTTP dependencies; the
//! `latchkey-http` crate drives it.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod options;
pub mod session;
pub mod stores;
pub mod token;
pub mod traits;
pub mod user;
pub mod utils;
pub mod verifier;

// Error handling
pub use error::AuthError;

// Core traits
pub use traits::{PasswordHasher, SessionCallbacks, UserStore};

// Configuration
pub use config::{
    AuthConfig, CookieConfig, PagesConfig, PasswordConfig, Secret, SessionConfig, SessionStrategy,
    UserTableConfig,
};

// Domain types
pub use callbacks::IdentityEnrichment;
pub use options::{AuthOptions, AuthOptionsBuilder, CredentialField, CredentialsProvider};
pub use session::{SessionUser, SessionView};
pub use stores::{MemoryUserStore, PgUserStore};
pub use token::{SessionToken, TokenCodec};
pub use user::{Credentials, Identity, StoredUser, UserId};
pub use utils::{CryptoUtils, PasswordHasherFactory};
pub use verifier::IdentityVerifier;

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

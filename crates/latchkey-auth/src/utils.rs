//! Password hashers and random value helpers

use crate::config::PasswordConfig;
use crate::{AuthError, AuthResult, PasswordHasher};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::sync::Arc;

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

/// Argon2id password hasher
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Cheap parameters for development and tests
    pub fn development() -> Self {
        Self::new(4096, 2, 1)
    }

    fn argon2(&self) -> AuthResult<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut thread_rng());
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::crypto_error(e.to_string()))?;

        // Parameters are read from the PHC string, not from self
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// bcrypt password hasher
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Minimum cost, for development and tests
    pub fn development() -> Self {
        Self { cost: 4 }
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        bcrypt::hash(password, self.cost).map_err(AuthError::from)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        bcrypt::verify(password, hash).map_err(AuthError::from)
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Builds the configured password hasher
pub struct PasswordHasherFactory;

impl PasswordHasherFactory {
    /// Create a hasher by algorithm name using the cost parameters in `config`
    pub fn create_hasher(algorithm: &str, config: &PasswordConfig) -> AuthResult<Arc<dyn PasswordHasher>> {
        match algorithm {
            #[cfg(feature = "argon2")]
            "argon2" => Ok(Arc::new(Argon2Hasher::new(
                config.argon2_memory,
                config.argon2_iterations,
                config.argon2_parallelism,
            ))),
            #[cfg(feature = "bcrypt")]
            "bcrypt" => Ok(Arc::new(BcryptHasher::new(config.bcrypt_cost))),
            _ => Err(AuthError::config_error(format!(
                "Unknown password hashing algorithm: {} (or feature not enabled)",
                algorithm
            ))),
        }
    }

    /// Create the hasher named by `config.hash_algorithm`
    pub fn from_config(config: &PasswordConfig) -> AuthResult<Arc<dyn PasswordHasher>> {
        Self::create_hasher(&config.hash_algorithm, config)
    }
}

/// Random value helpers
pub struct CryptoUtils;

impl CryptoUtils {
    /// Random alphanumeric string of `length` characters
    pub fn generate_random_string(length: usize) -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }

    /// Random hex token built from `bytes` random bytes
    pub fn generate_token(bytes: usize) -> String {
        let mut buf = vec![0u8; bytes];
        thread_rng().fill(buf.as_mut_slice());
        hex::encode(buf)
    }

    /// Generate a signing secret suitable for `AUTH_SECRET`
    pub fn generate_secret(length: Option<usize>) -> String {
        Self::generate_random_string(length.unwrap_or(64).max(crate::config::MIN_SECRET_LENGTH))
    }

    /// Compare two strings without short-circuiting on the first difference
    pub fn constant_time_eq(a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

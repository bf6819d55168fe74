use latchkey_auth::{AuthResult, CryptoUtils, PasswordConfig, PasswordHasher, PasswordHasherFactory};

/// Hash `password` with `algorithm`, optionally overriding the bcrypt cost
pub fn hash_password(password: &str, algorithm: &str, cost: Option<u32>) -> AuthResult<String> {
    let mut config = PasswordConfig::default();
    if let Some(cost) = cost {
        config.bcrypt_cost = cost;
    }
    PasswordHasherFactory::create_hasher(algorithm, &config)?.hash_password(password)
}

pub fn generate_secret(length: usize) -> String {
    CryptoUtils::generate_secret(Some(length))
}

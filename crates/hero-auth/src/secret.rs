//! Password and client secret hashing.
//!
//! User passwords and client secrets are never stored in clear. Both are
//! hashed with Argon2id using a fresh `OsRng` salt and stored as PHC strings.
//!
//! ```
//! use hero_auth::secret::{hash_secret, verify_secret};
//!
//! let hash = hash_secret("hunter2").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(verify_secret("hunter2", &hash).unwrap());
//! assert!(!verify_secret("hunter3", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

use crate::{AuthError, AuthResult};

/// Generate a client secret: 32 random bytes as hex with a `hs_` prefix.
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("hs_{}", hex::encode(bytes))
}

/// Hash a password or client secret for storage.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if Argon2 rejects the input.
pub fn hash_secret(secret: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch. Fails only if `hash` is not a valid PHC
/// string.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the stored hash cannot be parsed.
pub fn verify_secret(secret: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

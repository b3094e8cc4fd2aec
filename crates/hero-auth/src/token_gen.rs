//! Opaque code generators for authorization codes, tokens and client ids.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Produces globally unique, unguessable opaque codes.
///
/// Uniqueness comes from collision resistance rather than coordination, so
/// implementations must be safe to call concurrently.
pub trait TokenGenerator: Send + Sync {
    /// Returns a fresh opaque code.
    fn generate(&self) -> String;
}

/// Random UUID v4 codes. This is the default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// 256-bit random codes encoded as unpadded base64url.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let bytes: [u8; 32] = rand::thread_rng().r#gen();
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

//! Opaque refresh token generation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Generates opaque refresh tokens from the operating system CSPRNG.
///
/// Tokens are 64 random bytes encoded as standard padded base64, which
/// yields 88 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshTokenGenerator;

impl RefreshTokenGenerator {
    /// Creates a new generator.
    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh refresh token.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}

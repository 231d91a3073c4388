//! Cryptographic building blocks: password hashing, access token signing
//! and refresh token generation.

mod access_claims;
mod password_hasher;
mod refresh_token;
mod token_signer;

pub use access_claims::{AccessClaims, TOKEN_TYPE_BEARER};
pub use password_hasher::PasswordHasher;
pub use refresh_token::{REFRESH_TOKEN_BYTES, RefreshTokenGenerator};
pub use token_signer::{AccessToken, TokenError, TokenSigner};

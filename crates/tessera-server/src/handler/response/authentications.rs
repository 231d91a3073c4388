use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::{AccessClaims, TokenPair};

/// Response returned after a successful login or refresh.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    /// Signed access token.
    pub token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            token: pair.access_token.token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Response returned after a successful registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    /// ID of the new user.
    pub user_id: Uuid,
}

/// Access token presented by the caller, with its validated claims.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDataResponse {
    pub token: String,
    pub claims: AccessClaims,
}

//! Session token utilities using the HS256 algorithm.
//!
//! After the identity provider confirms who a visitor is, the API issues a
//! signed session token carrying the visitor's email (subject), display name
//! and picture. Handlers rebuild the authenticated identity from these claims
//! without a round trip to the store.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user email)
    pub sub: String,
    /// Display name snapshot from the identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Profile picture URL snapshot from the identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Signing configuration for session tokens.
#[derive(Clone)]
pub struct SessionTokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session lifetime in seconds
    pub expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Shortest secret accepted for HS256 signing.
pub const MIN_SECRET_LENGTH: usize = 16;

impl SessionTokenConfig {
    /// Creates a config from a shared secret with the default leeway.
    pub fn new(secret: &str, expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from a shared secret with a custom leeway.
    pub fn with_leeway(secret: &str, expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::InvalidKey(format!(
                "Session secret must be at least {} characters",
                MIN_SECRET_LENGTH
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a session token for the given identity.
    ///
    /// Returns the encoded token and its `jti`.
    pub fn issue(
        &self,
        email: &str,
        name: Option<&str>,
        picture: Option<&str>,
    ) -> Result<(String, String), JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = SessionClaims {
            sub: email.to_string(),
            name: name.map(str::to_string),
            picture: picture.map(str::to_string),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a session token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

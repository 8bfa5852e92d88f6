//! JWT token issuance and validation
//!
//! Tokens are HS256-signed and carry the username, the user's authorities
//! and an admin flag. Keys are derived once and shared through `AppState`.

use anyhow::Result;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_shared::{AuthError, RoleName};
use tracing::debug;

/// Length of a generated signing secret (HS256 wants at least 256 bits)
pub const GENERATED_SECRET_LEN: usize = 32;

/// JWT claims
///
/// A snapshot of the account at login time. Role changes made afterwards
/// are not reflected until the user signs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    pub username: String,
    /// Granted roles, in the order the store returned them
    pub authorities: Vec<RoleName>,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(
        username: &str,
        authorities: &[RoleName],
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: username.to_string(),
            username: username.to_string(),
            authorities: authorities.to_vec(),
            is_admin: authorities.contains(&RoleName::Admin),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Signs and verifies bearer tokens
///
/// The signing key is fixed at construction and read-only afterwards;
/// clones share the same keys.
#[derive(Clone)]
pub struct TokenCodec {
    keys: JwtKeys,
    ttl: Duration,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Create a codec for the given secret and token lifetime
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            ttl: Duration::seconds(ttl_secs),
            validation: Arc::new(validation),
        }
    }

    /// Generate a random signing secret from the OS RNG
    pub fn generate_secret() -> Vec<u8> {
        let mut secret = vec![0u8; GENERATED_SECRET_LEN];
        OsRng.fill_bytes(&mut secret);
        secret
    }

    /// Issue a token for a user, valid from now for the configured lifetime
    #[inline]
    pub fn issue(&self, username: &str, authorities: &[RoleName]) -> Result<String> {
        self.issue_at(username, authorities, Utc::now())
    }

    /// Issue a token as if it were signed at `issued_at`
    pub fn issue_at(
        &self,
        username: &str,
        authorities: &[RoleName],
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        self.encode(&Claims::new(username, authorities, issued_at, self.ttl))
    }

    /// Sign an arbitrary claims set
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::TokenInvalid,
                    _ => AuthError::TokenMalformed,
                }
            })
    }
}

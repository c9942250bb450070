//! Access token issuance and validation.
//!
//! Access tokens are HS256 JWTs carrying only `sub`, `iat` and `exp`. They are
//! stateless: nothing is stored, and they die by expiry alone.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::{Clock, TtlError, check_ttl};

/// HS256 needs a key at least as long as its 256-bit output.
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// Signing keys, access-token lifetime and the clock they are checked against.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: u64,
    clock: Arc<dyn Clock>,
}

impl JwtConfig {
    /// Fails when `secret` is shorter than [`MIN_SECRET_LENGTH`] bytes or
    /// `access_ttl` is outside `1..=MAX_TTL_SECS`.
    pub fn new(secret: &[u8], access_ttl: u64, clock: Arc<dyn Clock>) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::SecretTooShort {
                len: secret.len(),
                min: MIN_SECRET_LENGTH,
            });
        }

        let access_ttl = check_ttl("access token ttl", access_ttl)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            clock,
        })
    }

    pub fn access_ttl(&self) -> u64 {
        self.access_ttl
    }

    /// Mint an access token for `subject`, expiring `access_ttl` seconds from now.
    pub fn issue(&self, subject: &str) -> Result<AccessToken, JwtError> {
        let now = self.clock.now();
        let exp = now
            .checked_add(self.access_ttl)
            .ok_or(JwtError::TimeOverflow)?;

        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(AccessToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify signature and expiry and return the claims.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let claims = self.decode_signed(token)?;
        if claims.exp <= self.clock.now() {
            return Err(JwtError::Expired);
        }
        Ok(claims)
    }

    /// True only when the token is well-formed, correctly signed, unexpired and,
    /// if `expected_subject` is given, issued for that subject.
    pub fn validate(&self, token: &str, expected_subject: Option<&str>) -> bool {
        match self.decode(token) {
            Ok(claims) => expected_subject.is_none_or(|expected| claims.sub == expected),
            Err(_) => false,
        }
    }

    /// Read the subject of a correctly signed token. Expiry is not checked here.
    pub fn extract_subject(&self, token: &str) -> Result<String, JwtError> {
        self.decode_signed(token).map(|claims| claims.sub)
    }

    fn decode_signed(&self, token: &str) -> Result<AccessClaims, JwtError> {
        // Expiry is compared against the injected clock, not the library's.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::Decoding)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("Failed to decode token: {0}")]
    Decoding(jsonwebtoken::errors::Error),
    #[error("Token has expired")]
    Expired,
    #[error("JWT secret is {len} bytes, at least {min} are required")]
    SecretTooShort { len: usize, min: usize },
    #[error(transparent)]
    InvalidTtl(#[from] TtlError),
    #[error("Token expiry does not fit in a timestamp")]
    TimeOverflow,
}

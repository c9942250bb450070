//! Refresh token lifecycle: create, look up, and expire on use.
//!
//! Tokens are not rotated or extended. A token stays usable until the first
//! check at or after its expiry, which deletes it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use std::sync::Arc;
use tracing::debug;

use crate::clock::{Clock, TtlError, check_ttl};
use crate::db::{Database, Identity, RefreshToken};
use crate::error::AuthError;
use crate::jwt::JwtError;

/// Random bytes per refresh token value.
const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct RefreshTokenManager {
    db: Database,
    clock: Arc<dyn Clock>,
    refresh_ttl: u64,
}

impl RefreshTokenManager {
    /// Fails when `refresh_ttl` is outside `1..=MAX_TTL_SECS`.
    pub fn new(db: Database, clock: Arc<dyn Clock>, refresh_ttl: u64) -> Result<Self, TtlError> {
        Ok(Self {
            db,
            clock,
            refresh_ttl: check_ttl("refresh token ttl", refresh_ttl)?,
        })
    }

    /// Issue a refresh token for `identity`, replacing any token it already holds.
    pub async fn create(&self, identity: &Identity) -> Result<RefreshToken, AuthError> {
        let expires_at = self
            .clock
            .now()
            .checked_add(self.refresh_ttl)
            .ok_or(JwtError::TimeOverflow)?;
        let token = self
            .db
            .tokens()
            .upsert(&generate_token_value(), identity.id, expires_at)
            .await?;
        Ok(token)
    }

    pub async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(self.db.tokens().get_by_token(value).await?)
    }

    /// Return `record` unchanged if it is still live, otherwise delete it and
    /// fail with [`AuthError::TokenExpired`].
    ///
    /// Liveness is decided by the store at a single instant, so no caller
    /// succeeds from a record that another caller has already expired.
    pub async fn verify_not_expired(&self, record: RefreshToken) -> Result<RefreshToken, AuthError> {
        let now = self.clock.now();
        let tokens = self.db.tokens();

        if tokens.delete_if_expired(&record.token, now).await? {
            debug!(user_id = record.user_id, "Deleted expired refresh token");
            return Err(AuthError::TokenExpired);
        }

        // Gone or replaced since it was read
        if tokens.get_live(&record.token, now).await?.is_none() {
            return Err(AuthError::TokenExpired);
        }

        Ok(record)
    }
}

/// 256 bits from the thread-local CSPRNG, base64url without padding.
fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

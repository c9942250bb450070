//! Refresh token storage.
//!
//! Each user owns at most one refresh token. Access tokens are never stored.

use sqlx::sqlite::SqlitePool;

/// A stored refresh token record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: i64,
    /// Random opaque value handed to the client
    pub token: String,
    /// Expiry (Unix seconds)
    pub expires_at: u64,
    /// Owning user's row id
    pub user_id: i64,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: i64,
    token: String,
    expires_at: i64,
    user_id: i64,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at.max(0) as u64,
            user_id: row.user_id,
        }
    }
}

/// Store for refresh token records.
#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a refresh token for a user, replacing the value and expiry of any
    /// token the user already has.
    pub async fn upsert(
        &self,
        token: &str,
        user_id: i64,
        expires_at: u64,
    ) -> Result<RefreshToken, sqlx::Error> {
        let row: RefreshTokenRow = sqlx::query_as(
            "INSERT INTO refresh_tokens (token, expires_at, user_id) VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET token = excluded.token, expires_at = excluded.expires_at
             RETURNING id, token, expires_at, user_id",
        )
        .bind(token)
        .bind(to_db_time(expires_at))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Get a refresh token by its value, expired or not.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT id, token, expires_at, user_id FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Delete the token only if it has expired at `now`.
    /// Returns whether this call deleted it.
    pub async fn delete_if_expired(&self, token: &str, now: u64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ? AND expires_at <= ?")
            .bind(token)
            .bind(to_db_time(now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get the token only if it still exists and is unexpired at `now`.
    pub async fn get_live(
        &self,
        token: &str,
        now: u64,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT id, token, expires_at, user_id FROM refresh_tokens WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(to_db_time(now))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Number of stored refresh tokens.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM refresh_tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

/// SQLite integers are signed; clamp rather than wrap for far-future times.
fn to_db_time(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

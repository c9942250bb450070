mod token;
mod user;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use token::{RefreshToken, RefreshTokenStore};
pub use user::{Identity, UserStore};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT UNIQUE NOT NULL,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE TABLE roles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT UNIQUE NOT NULL
                )",
                "CREATE TABLE users_roles (
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
                    PRIMARY KEY (user_id, role_id)
                )",
                // One refresh token per user; expires_at is Unix seconds
                "CREATE TABLE refresh_tokens (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    token TEXT UNIQUE NOT NULL,
                    expires_at INTEGER NOT NULL,
                    user_id INTEGER UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE
                )",
            ],
        )
        .await
    }

    /// Get the user store.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Get the refresh token store.
    pub fn tokens(&self) -> RefreshTokenStore {
        RefreshTokenStore::new(self.pool.clone())
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("uuid-123", "alice", "hash")
            .await
            .unwrap();

        let user = db.users().get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.user_id, "uuid-123");
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");
        assert!(user.roles.is_empty());

        let user = db.users().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_username_fails() {
        let db = Database::open(":memory:").await.unwrap();

        db.users().create("uuid-1", "alice", "hash").await.unwrap();
        let err = db
            .users()
            .create("uuid-2", "alice", "hash")
            .await
            .unwrap_err();

        assert!(
            err.as_database_error()
                .is_some_and(|e| e.is_unique_violation())
        );
    }

    #[tokio::test]
    async fn test_roles_are_loaded() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db.users().create("uuid-1", "alice", "hash").await.unwrap();
        db.users().add_role(id, "user").await.unwrap();
        db.users().add_role(id, "admin").await.unwrap();
        db.users().add_role(id, "admin").await.unwrap();

        let user = db.users().get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.roles, vec!["admin".to_string(), "user".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let db = Database::open(":memory:").await.unwrap();

        assert!(db.users().get_by_username("ghost").await.unwrap().is_none());
        assert!(db.users().get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_drops_refresh_token() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db.users().create("uuid-1", "alice", "hash").await.unwrap();
        db.tokens().upsert("value-1", id, 1_000).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();

        assert!(db.tokens().get_by_token("value-1").await.unwrap().is_none());
    }
}

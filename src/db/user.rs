use sqlx::sqlite::SqlitePool;

/// Credential store for identities and their roles.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// A stored identity. Read-only outside this store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Row id, referenced by refresh tokens
    pub id: i64,
    /// Public user id (UUID)
    pub user_id: String,
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Role names, sorted
    pub roles: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_id: String,
    username: String,
    password_hash: String,
}

impl UserRow {
    fn into_identity(self, roles: Vec<String>) -> Identity {
        Identity {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            password_hash: self.password_hash,
            roles,
        }
    }
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with no roles. Returns the row id.
    pub async fn create(
        &self,
        user_id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO users (user_id, username, password_hash) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(username)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Identity>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, user_id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        self.with_roles(row).await
    }

    /// Get a user by row id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, user_id, username, password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        self.with_roles(row).await
    }

    /// Grant a role, creating it if needed. Granting twice is a no-op.
    /// Signup assigns no roles; operators grant them with `--grant-role`.
    pub async fn add_role(&self, id: i64, role: &str) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
            .bind(role)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT OR IGNORE INTO users_roles (user_id, role_id) SELECT ?, id FROM roles WHERE name = ?",
        )
        .bind(id)
        .bind(role)
        .execute(&mut *tx)
        .await?;
        tx.commit().await
    }

    async fn with_roles(&self, row: Option<UserRow>) -> Result<Option<Identity>, sqlx::Error> {
        let Some(row) = row else {
            return Ok(None);
        };

        let roles: Vec<(String,)> = sqlx::query_as(
            "SELECT r.name FROM roles r JOIN users_roles ur ON ur.role_id = r.id WHERE ur.user_id = ? ORDER BY r.name",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(
            row.into_identity(roles.into_iter().map(|(name,)| name).collect()),
        ))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use store::{IdentityStore, NewUser, StoreError, User, UserId};

/// Database row of the `users` table.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    password: Option<String>,
    token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            password: row.password,
            token: row.token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(err.to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// Postgres-backed IdentityStore.
#[derive(Clone, Debug)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(User::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users WHERE name = $1 ORDER BY id")
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (name, password, token) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.password)
        .bind(&user.token)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.into())
    }
}

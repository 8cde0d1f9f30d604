//! Database connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config;

/// Open the connection pool described by `settings.url`.
pub async fn connect(settings: &config::Database) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.url)
        .await
}

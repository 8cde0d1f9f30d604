//! Schema migrations and the one-shot reset & seed.

use sqlx::migrate::MigrateError;
use sqlx::PgPool;
use store::IdentityStore;
use tracing::info;

use crate::auth::CredentialAuthenticator;
use crate::error::ApiError;

/// Credential users inserted by [`seed`], as `(name, password)`.
pub const DEMO_USERS: [(&str, &str); 2] = [("moe", "foo"), ("larry", "bar")];

/// Apply pending migrations from `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Drop every piece of persistent state: users, the migration ledger and the
/// session store's schema. Run [`migrate`] (and the session store's own migration)
/// afterwards to recreate them.
pub async fn reset(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        "DROP TABLE IF EXISTS users",
        "DROP TABLE IF EXISTS _sqlx_migrations",
        "DROP SCHEMA IF EXISTS tower_sessions CASCADE",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("persistent state dropped");
    Ok(())
}

/// Insert the demo credential users.
pub async fn seed(store: &dyn IdentityStore) -> Result<(), ApiError> {
    let auth = CredentialAuthenticator::new(store);
    for (name, password) in DEMO_USERS {
        let user = auth.register(name, password).await?;
        info!(user_id = user.id, name, "seeded demo user");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    #[tokio::test]
    async fn test_seed_creates_loginable_demo_users() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();
        assert_eq!(store.len(), DEMO_USERS.len());

        let auth = CredentialAuthenticator::new(&store);
        for (name, password) in DEMO_USERS {
            let user = auth.authenticate(name, password).await.unwrap();
            assert_eq!(user.name, name);
            assert!(user.token.is_none());
        }
    }
}

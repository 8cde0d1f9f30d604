//! # Identity store: the narrow persistence interface for user records
//!
//! Everything above this crate reaches users only through [`IdentityStore`]. It has
//! four operations, mirroring what the authentication core needs and nothing more:
//!
//! | Method | Used by |
//! |--------|---------|
//! | [`find_by_id`](IdentityStore::find_by_id) | session resolution on every request |
//! | [`find_by_name`](IdentityStore::find_by_name) | credential login (candidates are verified against their hash) |
//! | [`find_by_token`](IdentityStore::find_by_token) | federation find-or-create |
//! | [`create`](IdentityStore::create) | federation sign-in and credential registration |
//!
//! Implementations: [`crate::MemoryStore`] here, and the Postgres store in the `api`
//! crate.

use async_trait::async_trait;

use crate::models::{NewUser, User, UserId};

/// Errors raised by an identity store backend.
///
/// A missing record is not an error; lookups return `Ok(None)` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
    #[error("identity store rejected the write: {0}")]
    Conflict(String),
    #[error("malformed user record: {0}")]
    Corrupt(String),
}

/// Async trait for looking up and creating user records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// All users whose name matches exactly. Names are not unique.
    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

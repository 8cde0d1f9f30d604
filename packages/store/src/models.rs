//! # User records
//!
//! Defines the two representations of a gateway user:
//!
//! ## [`User`]
//!
//! The complete identity record as the store keeps it:
//!
//! - `id`: store-assigned identifier.
//! - `name`: display name. Not unique: a credential user and a federation user
//!   may share one, and they remain separate identities.
//! - `password`: Argon2id PHC hash, present only for credential users.
//! - `token`: provider access token, present only for federation users.
//! - `created_at` / `updated_at`: audit timestamps.
//!
//! ## [`UserInfo`]
//!
//! The projection that is sent back to HTTP clients. It never carries the password
//! hash or the provider token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i64;

/// Full user record.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub password: Option<String>,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Convert to UserInfo for client consumption.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether this user was created through the credential path.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Whether this user was created through the federation path.
    pub fn is_federated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Fields required to create a user. The store assigns `id` and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl NewUser {
    /// A credential user holding an already hashed password.
    pub fn with_password(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Some(password_hash.into()),
            token: None,
        }
    }

    /// A federation user bound to a provider access token.
    pub fn with_token(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
            token: Some(token.into()),
        }
    }
}

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Name + password authentication against the identity store.

use store::{IdentityStore, NewUser, User};
use tracing::debug;

use super::password::{hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;

/// Verifies credential pairs and registers credential users.
pub struct CredentialAuthenticator<'a> {
    store: &'a dyn IdentityStore,
}

impl<'a> CredentialAuthenticator<'a> {
    pub fn new(store: &'a dyn IdentityStore) -> Self {
        Self { store }
    }

    /// Find the credential user with exactly this name and password.
    ///
    /// An unknown name and a wrong password both yield [`ApiError::Unauthorized`].
    pub async fn authenticate(&self, name: &str, password: &str) -> Result<User, ApiError> {
        let candidates = self.store.find_by_name(name).await?;

        for user in candidates {
            // Federation users share the name space but have no password.
            let Some(hash) = user.password.as_deref() else {
                continue;
            };
            if verify_password_blocking(password, hash).await? {
                return Ok(user);
            }
        }

        debug!("credential login rejected");
        Err(ApiError::Unauthorized)
    }

    /// Create a credential user, storing only the password hash.
    pub async fn register(&self, name: &str, password: &str) -> Result<User, ApiError> {
        let hash = hash_password_blocking(password).await?;
        Ok(self.store.create(NewUser::with_password(name, hash)).await?)
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::identity::{IdentityStore, StoreError};
use crate::models::{NewUser, User, UserId};

/// In-memory IdentityStore for testing and local runs without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: UserId,
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    ///
    /// # Panics
    ///
    /// If the lock is poisoned. Trait methods report that as
    /// [`StoreError::Unavailable`] instead.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("memory store lock poisoned").users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a user, as an administrator deleting the row would.
    ///
    /// # Panics
    ///
    /// If the lock is poisoned.
    pub fn remove(&self, id: UserId) -> Option<User> {
        let mut inner = self.inner.lock().expect("memory store lock poisoned");
        let pos = inner.users.iter().position(|u| u.id == id)?;
        Some(inner.users.remove(pos))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| u.name == name)
            .cloned()
            .collect())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        if let Some(token) = user.token.as_deref() {
            if inner.users.iter().any(|u| u.token.as_deref() == Some(token)) {
                return Err(StoreError::Conflict("token already bound to a user".to_string()));
            }
        }
        inner.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.next_id,
            name: user.name,
            password: user.password,
            token: user.token,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let moe = store.create(NewUser::with_password("moe", "hash-a")).await.unwrap();
        let larry = store.create(NewUser::with_password("larry", "hash-b")).await.unwrap();

        assert_ne!(moe.id, larry.id);
        assert_eq!(store.len(), 2);
        assert!(moe.has_password());
        assert!(!moe.is_federated());
    }

    #[tokio::test]
    async fn test_find_by_id_and_token() {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser::with_token("moe@example.com", "tok-1"))
            .await
            .unwrap();

        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_token("tok-1").await.unwrap(), Some(user));
        assert!(store.find_by_token("tok-2").await.unwrap().is_none());
        assert!(store.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_returns_every_match() {
        let store = MemoryStore::new();
        store.create(NewUser::with_password("moe", "h1")).await.unwrap();
        store.create(NewUser::with_token("moe", "tok")).await.unwrap();
        store.create(NewUser::with_password("curly", "h2")).await.unwrap();

        let found = store.find_by_name("moe").await.unwrap();
        assert_eq!(found.len(), 2);
        // Exact match only.
        assert!(store.find_by_name("Moe").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let store = MemoryStore::new();
        store.create(NewUser::with_token("a@example.com", "tok")).await.unwrap();
        let err = store
            .create(NewUser::with_token("b@example.com", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        let user = store.create(NewUser::with_password("moe", "h")).await.unwrap();
        assert_eq!(store.remove(user.id).map(|u| u.id), Some(user.id));
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.remove(user.id).is_none());
    }

    fn poisoned() -> MemoryStore {
        let store = MemoryStore::new();
        let held = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = held.inner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        store
    }

    #[test]
    #[should_panic(expected = "memory store lock poisoned")]
    fn test_len_panics_on_poisoned_lock() {
        poisoned().len();
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_unavailable() {
        let store = poisoned();
        let err = store.find_by_token("tok").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}

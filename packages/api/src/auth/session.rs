//! # Session manager: binding a browser session to a local user
//!
//! Sessions are server-side records managed by `tower-sessions`; the browser holds
//! only a signed cookie with the opaque session id. A session carries at most two
//! values, both plain user ids:
//!
//! | Key | Written by |
//! |-----|------------|
//! | [`SESSION_USER_ID_KEY`] | credential login (`POST /api/sessions`) |
//! | [`SESSION_FEDERATED_USER_ID_KEY`] | the federation callback |
//!
//! Each request re-fetches the full users through the identity store
//! ([`SessionManager::current`]). An id whose user no longer exists resolves to
//! anonymous; a failing store or session backend fails the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha512};
use store::{IdentityStore, User, UserId};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tracing::warn;

use crate::config;
use crate::error::ApiError;

/// Key for storing the credential user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Key for storing the federated user ID in session.
pub const SESSION_FEDERATED_USER_ID_KEY: &str = "federated_user_id";

/// The identity resolved for one request.
///
/// Inserted into the request extensions by [`super::resolve_identity`] before any
/// handler runs; handlers and the gate read it, nobody mutates it.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    session_user: Option<User>,
    federated_user: Option<User>,
}

impl RequestIdentity {
    /// Whether a credential-session user is present. This is what the gate checks.
    pub fn is_authenticated(&self) -> bool {
        self.session_user.is_some()
    }

    /// The credential user, falling back to the federated one.
    pub fn any_user(&self) -> Option<&User> {
        self.session_user.as_ref().or(self.federated_user.as_ref())
    }
}

/// Owns every read and write of session state.
#[derive(Debug, Clone)]
pub struct SessionManager {
    session: Session,
}

impl SessionManager {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Bind a credential user to the session. Re-login overwrites.
    pub async fn login(&self, user: &User) -> Result<(), ApiError> {
        self.bind(SESSION_USER_ID_KEY, user.id).await
    }

    /// Bind a federated user to the session. Only the id is stored.
    pub async fn login_federated(&self, user: &User) -> Result<(), ApiError> {
        self.bind(SESSION_FEDERATED_USER_ID_KEY, user.id).await
    }

    async fn bind(&self, key: &str, id: UserId) -> Result<(), ApiError> {
        // New privileges, new session id.
        self.session.cycle_id().await?;
        self.session.insert(key, id).await?;
        Ok(())
    }

    /// Resolve the users bound to this session.
    pub async fn current(&self, store: &dyn IdentityStore) -> Result<RequestIdentity, ApiError> {
        Ok(RequestIdentity {
            session_user: self.resolve(SESSION_USER_ID_KEY, store).await?,
            federated_user: self.resolve(SESSION_FEDERATED_USER_ID_KEY, store).await?,
        })
    }

    async fn resolve(&self, key: &str, store: &dyn IdentityStore) -> Result<Option<User>, ApiError> {
        let Some(id) = self.session.get::<UserId>(key).await? else {
            return Ok(None);
        };

        let user = store.find_by_id(id).await?;
        if user.is_none() {
            warn!(user_id = id, key, "session refers to a missing user, continuing as anonymous");
        }
        Ok(user)
    }

    /// Destroy the session: its data, its stored record and its id.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.flush().await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for SessionManager
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session))
    }
}

/// Build the session layer: signed cookie, inactivity expiry.
///
/// The signing key is derived from `settings.secret`, so any secret length works.
pub fn session_layer<S>(store: S, settings: &config::Session) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    let key = Key::from(Sha512::digest(settings.secret.as_bytes()).as_slice());

    SessionManagerLayer::new(store)
        .with_secure(settings.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(settings.lifetime)))
        .with_signed(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            password: None,
            token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_identity() {
        let identity = RequestIdentity::default();
        assert!(!identity.is_authenticated());
        assert!(identity.any_user().is_none());
    }

    #[test]
    fn test_session_user_wins_over_federated() {
        let identity = RequestIdentity {
            session_user: Some(user(1, "moe")),
            federated_user: Some(user(2, "moe@example.com")),
        };
        assert!(identity.is_authenticated());
        assert_eq!(identity.any_user().map(|u| u.id), Some(1));
    }

    #[test]
    fn test_federated_user_alone_does_not_pass_the_gate() {
        let identity = RequestIdentity {
            session_user: None,
            federated_user: Some(user(2, "moe@example.com")),
        };
        assert!(!identity.is_authenticated());
        assert_eq!(identity.any_user().map(|u| u.id), Some(2));
    }
}

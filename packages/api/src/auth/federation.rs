//! # OAuth2 federation: provider seam and user resolution
//!
//! A [`FederationProvider`] performs the two provider-facing legs of the
//! authorization-code grant: it builds the authorize URL the browser is sent to, and
//! it turns the code delivered to the callback into a [`FederationExchange`]
//! (access token, optional refresh token, profile).
//!
//! What happens with the exchange is provider-independent and lives in
//! [`resolve_user`]:
//!
//! - a profile without a verified email fails with
//!   [`FederationError::ProfileIncomplete`] and touches nothing;
//! - a user whose stored token equals the access token is returned unchanged (the
//!   token is not rotated on repeat sign-in);
//! - otherwise a new user is created, named after the first verified email and bound
//!   to the access token, without a password. If a concurrent callback bound the
//!   same token first, the store rejects the insert and that user is returned.

use async_trait::async_trait;
use store::{IdentityStore, NewUser, StoreError, User};
use tracing::{debug, info};

/// One email address from a provider profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEmail {
    pub value: String,
    pub verified: bool,
}

/// The provider's view of the signed-in account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// Provider-side account id, when the provider reports one.
    pub subject: Option<String>,
    pub emails: Vec<ProfileEmail>,
}

impl Profile {
    /// The first verified email address.
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.verified)
            .map(|e| e.value.as_str())
    }
}

/// Result of a completed code exchange. Consumed once, never persisted as such.
#[derive(Debug, Clone)]
pub struct FederationExchange {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub profile: Profile,
}

#[derive(Debug, thiserror::Error)]
pub enum FederationError {
    #[error("provider returned an error: {0}")]
    Denied(String),
    #[error("callback carried no authorization code")]
    MissingCode,
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("profile request failed: {0}")]
    Profile(#[from] reqwest::Error),
    #[error("provider profile has no verified email")]
    ProfileIncomplete,
    #[error("invalid provider configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FederationError {
    /// Whether the failure lies with a backend (provider network or identity store)
    /// rather than with the user's sign-in attempt.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            FederationError::Exchange(_)
                | FederationError::Profile(_)
                | FederationError::Config(_)
                | FederationError::Store(_)
        )
    }
}

/// An external OAuth2 identity provider.
#[async_trait]
pub trait FederationProvider: Send + Sync {
    /// Short provider name, used in logs.
    fn name(&self) -> &'static str;

    /// URL of the provider's consent page, requesting the `email` scope.
    fn authorize_url(&self) -> String;

    /// Exchange an authorization code for tokens and the account profile.
    async fn exchange(&self, code: &str) -> Result<FederationExchange, FederationError>;
}

/// Find or create the local user for a completed exchange.
pub async fn resolve_user(
    store: &dyn IdentityStore,
    exchange: &FederationExchange,
) -> Result<User, FederationError> {
    let email = exchange
        .profile
        .primary_email()
        .ok_or(FederationError::ProfileIncomplete)?;

    if let Some(user) = store.find_by_token(&exchange.access_token).await? {
        return Ok(user);
    }

    match store
        .create(NewUser::with_token(email, exchange.access_token.as_str()))
        .await
    {
        Ok(user) => {
            info!(
                user_id = user.id,
                subject = exchange.profile.subject.as_deref(),
                "created federated user"
            );
            Ok(user)
        }
        Err(StoreError::Conflict(reason)) => store
            .find_by_token(&exchange.access_token)
            .await?
            .ok_or(FederationError::Store(StoreError::Conflict(reason))),
        Err(e) => Err(e.into()),
    }
}

/// Run the callback leg: exchange `code` with `provider`, then resolve the user.
pub async fn complete(
    provider: &dyn FederationProvider,
    store: &dyn IdentityStore,
    code: &str,
) -> Result<User, FederationError> {
    let exchange = provider.exchange(code).await?;
    debug!(
        provider = provider.name(),
        refresh_token = exchange.refresh_token.is_some(),
        "code exchanged"
    );
    resolve_user(store, &exchange).await
}

//! OAuth endpoint configuration, validated from [`crate::config::Google`].

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use super::federation::FederationError;
use crate::config;

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// Create Google OAuth config from the loaded settings.
    pub fn google(settings: &config::Google) -> Result<Self, FederationError> {
        if settings.client.is_empty() || settings.secret.is_empty() {
            return Err(FederationError::Config(
                "google client id and secret must be set".to_string(),
            ));
        }

        Ok(Self {
            client_id: ClientId::new(settings.client.clone()),
            client_secret: ClientSecret::new(settings.secret.clone()),
            auth_url: AuthUrl::new(settings.authorize.clone())
                .map_err(|e| FederationError::Config(format!("google.authorize: {e}")))?,
            token_url: TokenUrl::new(settings.token.clone())
                .map_err(|e| FederationError::Config(format!("google.token: {e}")))?,
            redirect_url: RedirectUrl::new(settings.callback.clone())
                .map_err(|e| FederationError::Config(format!("google.callback: {e}")))?,
        })
    }
}

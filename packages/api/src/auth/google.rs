//! # Google OAuth 2.0 provider
//!
//! [`GoogleOAuth`] implements [`FederationProvider`] against Google's endpoints (all
//! three are configurable, see [`crate::config::Google`]).
//!
//! ## Flow
//!
//! 1. **[`authorize_url`](FederationProvider::authorize_url)** builds the consent URL
//!    with the `email` scope. Nothing is stored locally for this leg.
//!
//! 2. **[`exchange`](FederationProvider::exchange)** is driven by the
//!    `/auth/google/callback` route. It:
//!    - exchanges the authorization code for an access token (and refresh token when
//!      Google issues one);
//!    - fetches the account from the userinfo endpoint with the access token;
//!    - reports the account email with its `email_verified` flag.
//!
//! Both network calls share one `reqwest` client with a request timeout, so a slow
//! provider fails the sign-in instead of holding the request open.

use std::time::Duration;

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, Scope, TokenResponse};
use serde::Deserialize;

use super::config::OAuthConfig;
use super::federation::{
    FederationError, FederationExchange, FederationProvider, Profile, ProfileEmail,
};
use crate::config;

/// Google userinfo response.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl GoogleUser {
    fn into_profile(self) -> Profile {
        let verified = self.email_verified;
        Profile {
            subject: Some(self.sub),
            emails: self
                .email
                .map(|value| ProfileEmail { value, verified })
                .into_iter()
                .collect(),
        }
    }
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler.
pub struct GoogleOAuth {
    client: ConfiguredClient,
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleOAuth {
    /// Create a new Google OAuth handler.
    pub fn new(settings: &config::Google) -> Result<Self, FederationError> {
        let config = OAuthConfig::google(settings)?;

        // The token endpoint must not be followed through redirects.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(settings.timeout))
            .build()
            .map_err(|e| FederationError::Config(e.to_string()))?;

        Ok(Self {
            client: create_client(&config),
            http,
            userinfo_url: settings.userinfo.clone(),
        })
    }
}

fn create_client(config: &OAuthConfig) -> ConfiguredClient {
    BasicClient::new(config.client_id.clone())
        .set_client_secret(config.client_secret.clone())
        .set_auth_uri(config.auth_url.clone())
        .set_token_uri(config.token_url.clone())
        .set_redirect_uri(config.redirect_url.clone())
}

#[async_trait]
impl FederationProvider for GoogleOAuth {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorize_url(&self) -> String {
        // The state value is required by the builder but not checked on callback.
        let (auth_url, _state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("email".to_string()))
            .url();
        auth_url.to_string()
    }

    async fn exchange(&self, code: &str) -> Result<FederationExchange, FederationError> {
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| FederationError::Exchange(e.to_string()))?;

        let access_token = token_result.access_token().secret().clone();
        let refresh_token = token_result.refresh_token().map(|t| t.secret().clone());

        let google_user: GoogleUser = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(FederationExchange {
            access_token,
            refresh_token,
            profile: google_user.into_profile(),
        })
    }
}

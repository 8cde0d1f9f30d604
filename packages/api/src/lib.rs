//! # API crate: the gateway's authentication core and HTTP surface
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Credential login, Google OAuth federation, session manager, authorization gate, password hashing |
//! | [`config`] | Typed [`Settings`](config::Settings) loaded from defaults, `config.toml` and the environment |
//! | [`db`] | PostgreSQL pool, the Postgres identity store, migrations and the reset & seed switch |
//! | [`error`] | [`ApiError`] and its mapping to HTTP responses |
//!
//! ## Routes
//!
//! | Method | Path | Access | Handler |
//! |--------|------|--------|---------|
//! | GET | `/` | public | landing page |
//! | GET | `/login` | public | login page |
//! | GET | `/login/google` | public | redirect to Google, scope `email` |
//! | GET | `/auth/google/callback` | public | complete federation, redirect to the success or failure destination |
//! | GET | `/restricted` | gate | protected page, else 401 |
//! | GET | `/api/sessions` | session or federation | current user JSON, else 401 |
//! | POST | `/api/sessions` | public | credential login, user JSON or 401 |
//! | DELETE | `/api/sessions` | public | destroy the session |
//!
//! [`router`] wires identity resolution in front of every route. The caller must
//! add the session layer ([`auth::session_layer`]) on top of the returned router.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use store::{IdentityStore, UserInfo};
use tracing::{error, info, warn};

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
mod pages;

pub use error::ApiError;

use auth::{CredentialAuthenticator, FederationError, FederationProvider, RequestIdentity, SessionManager};

/// Shared handler state. Cloned per request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IdentityStore>,
    pub federation: Arc<dyn FederationProvider>,
    pub redirects: Arc<config::Auth>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        federation: Arc<dyn FederationProvider>,
        redirects: config::Auth,
    ) -> Self {
        Self {
            store,
            federation,
            redirects: Arc::new(redirects),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/restricted", get(restricted))
        .route_layer(middleware::from_fn(auth::require_auth));

    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page))
        .route("/login/google", get(login_google))
        .route("/auth/google/callback", get(google_callback))
        .route(
            "/api/sessions",
            get(get_session).post(create_session).delete(delete_session),
        )
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_identity,
        ))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(pages::INDEX)
}

async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN)
}

async fn restricted() -> Html<&'static str> {
    Html(pages::RESTRICTED)
}

/// Send the browser to the provider's consent page.
async fn login_google(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.federation.authorize_url())
}

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

async fn google_callback(
    State(state): State<AppState>,
    sessions: SessionManager,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Redirect {
    let provider = state.federation.name();

    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => {
            warn!(provider, error = %e, "malformed federation callback");
            return Redirect::to(&state.redirects.failure);
        }
    };

    let result = match (params.error, params.code) {
        (Some(reason), _) => Err(FederationError::Denied(reason)),
        (None, None) => Err(FederationError::MissingCode),
        (None, Some(code)) => {
            auth::complete(state.federation.as_ref(), state.store.as_ref(), &code).await
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(e) if e.is_upstream() => {
            error!(provider, error = %e, "federated login failed");
            return Redirect::to(&state.redirects.failure);
        }
        Err(e) => {
            warn!(provider, error = %e, "federated login rejected");
            return Redirect::to(&state.redirects.failure);
        }
    };

    if let Err(e) = sessions.login_federated(&user).await {
        error!(provider, error = %e, "failed to bind federated user to session");
        return Redirect::to(&state.redirects.failure);
    }

    info!(provider, user_id = user.id, "federated login");
    Redirect::to(&state.redirects.success)
}

/// Body of `POST /api/sessions`.
#[derive(Deserialize)]
struct Credentials {
    name: String,
    password: String,
}

async fn get_session(
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<UserInfo>, ApiError> {
    identity
        .any_user()
        .map(|user| Json(user.to_info()))
        .ok_or(ApiError::Unauthorized)
}

async fn create_session(
    State(state): State<AppState>,
    sessions: SessionManager,
    Json(credentials): Json<Credentials>,
) -> Result<Json<UserInfo>, ApiError> {
    let user = CredentialAuthenticator::new(state.store.as_ref())
        .authenticate(&credentials.name, &credentials.password)
        .await?;

    sessions.login(&user).await?;
    info!(user_id = user.id, "credential login");
    Ok(Json(user.to_info()))
}

async fn delete_session(sessions: SessionManager) -> Result<StatusCode, ApiError> {
    sessions.logout().await?;
    Ok(StatusCode::OK)
}

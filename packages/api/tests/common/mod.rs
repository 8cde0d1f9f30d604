#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use api::auth::{
    session_layer, FederationError, FederationExchange, FederationProvider, Profile, ProfileEmail,
};
use api::config;
use api::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use store::{IdentityStore, MemoryStore, NewUser, StoreError, User, UserId};
use tower::ServiceExt;

pub const AUTHORIZE_URL: &str = "https://provider.test/authorize?scope=email";

/// Provider that answers exchanges from a table of prepared codes.
#[derive(Default)]
pub struct ScriptedProvider {
    exchanges: Mutex<HashMap<String, FederationExchange>>,
}

impl ScriptedProvider {
    pub fn with_code(self, code: &str, token: &str, emails: &[&str]) -> Self {
        let exchange = FederationExchange {
            access_token: token.to_string(),
            refresh_token: Some(format!("refresh-{token}")),
            profile: Profile {
                subject: Some(format!("sub-{token}")),
                emails: emails
                    .iter()
                    .map(|value| ProfileEmail {
                        value: value.to_string(),
                        verified: true,
                    })
                    .collect(),
            },
        };
        self.exchanges
            .lock()
            .unwrap()
            .insert(code.to_string(), exchange);
        self
    }
}

#[async_trait]
impl FederationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn authorize_url(&self) -> String {
        AUTHORIZE_URL.to_string()
    }

    async fn exchange(&self, code: &str) -> Result<FederationExchange, FederationError> {
        self.exchanges
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| FederationError::Exchange(format!("unknown code {code}")))
    }
}

/// MemoryStore whose lookups can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityStore for FlakyStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<User>, StoreError> {
        self.check()?;
        self.inner.find_by_name(name).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        self.inner.find_by_token(token).await
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        self.check()?;
        self.inner.create(user).await
    }
}

pub fn session_settings() -> config::Session {
    config::Session {
        secret: "test session secret".to_string(),
        lifetime: 3600,
        secure: false,
    }
}

/// Full application over the given stores, with an in-memory session store.
pub fn app(store: impl IdentityStore + 'static, provider: ScriptedProvider) -> Router {
    let state = AppState::new(Arc::new(store), Arc::new(provider), config::Auth::default());
    api::router(state).layer(session_layer(
        tower_sessions::MemoryStore::default(),
        &session_settings(),
    ))
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    api::db::seed(&store).await.unwrap();
    store
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    json: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match json {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// `name=value` part of the response's session cookie, if one was set.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

//! Error type returned by the HTTP handlers.
//!
//! Authentication failures are expected and map to a bare 401. Everything else is a
//! backend failure: it is logged and answered with a generic 500 so that a wrong
//! password and an unreachable database stay distinguishable.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use store::StoreError;

use crate::auth::PasswordError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad credentials or no authenticated session.
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("session store failure: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            err => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

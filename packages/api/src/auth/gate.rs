//! Request pipeline middleware: identity resolution, then the authorization gate.
//!
//! [`resolve_identity`] runs once per request, early, and leaves a
//! [`RequestIdentity`] in the request extensions. [`require_auth`] is layered onto
//! protected routes only and decides from that identity without touching the session.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::session::{RequestIdentity, SessionManager};
use crate::error::ApiError;
use crate::AppState;

/// Resolve the session's users and attach them to the request.
pub async fn resolve_identity(
    State(state): State<AppState>,
    sessions: SessionManager,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = sessions.current(state.store.as_ref()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Reject with a bare 401 unless a credential-session user is present.
pub async fn require_auth(request: Request, next: Next) -> Response {
    match request.extensions().get::<RequestIdentity>() {
        Some(identity) if identity.is_authenticated() => next.run(request).await,
        Some(_) => StatusCode::UNAUTHORIZED.into_response(),
        None => {
            error!(path = %request.uri().path(), "authorization gate ran before identity resolution");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

//! Authentication: credentials, OAuth federation, sessions and the request gate.

mod config;
mod credentials;
mod federation;
mod gate;
mod google;
mod password;
mod session;

pub use config::OAuthConfig;
pub use credentials::CredentialAuthenticator;
pub use federation::{
    complete, resolve_user, FederationError, FederationExchange, FederationProvider, Profile,
    ProfileEmail,
};
pub use gate::{require_auth, resolve_identity};
pub use google::GoogleOAuth;
pub use password::{hash_password_blocking, verify_password_blocking, PasswordError};
pub use session::{
    session_layer, RequestIdentity, SessionManager, SESSION_FEDERATED_USER_ID_KEY,
    SESSION_USER_ID_KEY,
};

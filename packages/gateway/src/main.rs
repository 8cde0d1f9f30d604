use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api::auth::{session_layer, GoogleOAuth};
use api::config::Settings;
use api::{db, AppState};
use tower_http::trace::TraceLayer;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load settings")?;

    // Initialize database pool
    let pool = db::connect(&settings.database)
        .await
        .context("Failed to connect to database")?;

    if settings.database.reset {
        warn!("database.reset is set, dropping all persistent state");
        db::reset(&pool).await.context("Failed to reset database")?;
    }

    // Run migrations
    db::migrate(&pool)
        .await
        .context("Failed to run migrations")?;

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;

    let identity_store = Arc::new(db::PgIdentityStore::new(pool.clone()));
    if settings.database.reset {
        db::seed(identity_store.as_ref())
            .await
            .context("Failed to seed demo users")?;
    }

    let google = GoogleOAuth::new(&settings.google).context("Invalid Google OAuth settings")?;
    let state = AppState::new(identity_store, Arc::new(google), settings.auth.clone());

    let router = api::router(state)
        .layer(session_layer(session_store, &settings.session))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on port {}", settings.server.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}

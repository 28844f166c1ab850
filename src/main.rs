//! Permit API - role and menu permission authentication service
//!
//! Verifies credentials, resolves a principal's roles and menu permissions,
//! issues self-contained bearer tokens and returns a permission-scoped menu
//! tree at login. Protected requests are authorized from the token alone.

mod auth;
mod config;
mod error;
mod menu;
mod models;
mod repository;
mod routes;
mod seed;
mod state;

use crate::auth::{DecoyHash, TokenService};
use crate::config::Settings;
use crate::routes::create_router;
use crate::seed::SeedData;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Permit API...");

    // A missing signing key stops startup here
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let seed = match &settings.seed.path {
        Some(path) => {
            info!("📦 Loading access snapshot from {}", path.display());
            SeedData::from_path(path)?
        }
        None => {
            info!("📦 Loading built-in access snapshot");
            SeedData::builtin()?
        }
    };
    let bcrypt_cost = settings.auth.bcrypt_cost;
    let (repository, decoy) = tokio::task::spawn_blocking(move || {
        let repository = seed.into_repository(bcrypt_cost)?;
        let decoy = DecoyHash::new(bcrypt_cost)?;
        Ok::<_, error::AppError>((repository, decoy))
    })
    .await??;

    let tokens = TokenService::from_config(&settings.auth);
    info!("🔑 Tokens expire after {} seconds", tokens.ttl().num_seconds());

    let state = Arc::new(AppState::new(Arc::new(repository), tokens, decoy));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   POST /api/auth/login                    - Login with username/password");
    info!("   GET  /api/auth/me                       - Current principal");
    info!("   GET  /api/auth/menus                    - Current menu tree");
    info!("   GET  /api/roles/active                  - Active roles (ADMIN or MANAGER)");
    info!("   GET  /api/users/{{username}}/authorities  - Resolved authorities (ADMIN)");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,permit_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}

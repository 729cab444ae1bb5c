use std::{net::SocketAddr, str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::core::{CredentialStore, PasswordHasher, TokenService};
use crate::models::AppState;

mod api;
mod config;
mod core;
mod models;
mod system;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_str(&config.log_level).context("Invalid RUST_LOG filter")?)
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Log level: {}", config.log_level);
    info!("Config: {:?}", config);
    if config.has_weak_secret() {
        warn!("SECRET is shorter than 32 bytes; use a longer random value");
    }

    let hasher = PasswordHasher::new(config.bcrypt_cost).context("Invalid BCRYPT_COST")?;
    let tokens = TokenService::new(config.secret.as_bytes(), config.algorithm, config.token_ttl)
        .context("Invalid token configuration")?;
    let store = CredentialStore::new();
    info!(
        "Tokens signed with {:?}, valid for {} minutes; bcrypt cost {}",
        tokens.algorithm(),
        tokens.ttl().num_minutes(),
        hasher.cost()
    );

    if let Err(e) = system::seed_admin(&store, &hasher, config.admin.as_ref()).await {
        error!("Error seeding admin user: {:#}", e);
    }

    let state = Arc::new(AppState {
        store,
        hasher,
        tokens,
    });

    let app = api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("authly listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("authly stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

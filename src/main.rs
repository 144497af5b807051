//! Car inventory API server

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;

use car_inventory_server::config::{Config, StorageBackend};
use car_inventory_server::state::{cleanup_task, AppState};
use car_inventory_server::{app_router, db};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        storage = config.storage.as_str(),
        "Starting car inventory server"
    );

    let app_state = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            tracing::info!(
                url = config.database_url_masked().as_deref().unwrap_or_default(),
                "Connecting to database..."
            );
            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            AppState::postgres(&config, pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::in_memory(&config)
        }
    };

    let cleanup = tokio::spawn(cleanup_task(app_state.clone(), CLEANUP_INTERVAL));
    let db_pool = app_state.db_pool.clone();

    let app = app_router(app_state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    cleanup.abort();
    if let Some(pool) = db_pool {
        pool.close().await;
        tracing::info!("Database connections closed");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

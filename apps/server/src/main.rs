//! # Shopkeep Server
//!
//! Entry point: config, database, router, serve until a shutdown signal.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  init_tracing ──► ServerConfig::load ──► Database::new (+ migrations)  │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │  axum::serve ◄── TcpListener::bind ◄── Views::new (templates)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ctrl+C / SIGTERM ──► drain requests ──► Database::close               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use shopkeep_db::Database;
use shopkeep_server::{app, init_tracing, AppState, ServerConfig, Views};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Shopkeep server...");

    let config = ServerConfig::load(None).context("Failed to load configuration")?;
    let db_path = config.database_path();
    info!(
        addr = %config.server.bind_address(),
        db_path = %db_path.display(),
        "Configuration loaded"
    );

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let views = Views::new().context("Failed to compile page templates")?;
    let router = app(AppState::new(db.clone(), views));

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}

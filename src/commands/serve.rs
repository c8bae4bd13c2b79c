//! Serve command - Starts the HTTP server.

use chrono::Utc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{bootstrap, connect_storage};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Connection or migration failure aborts startup
    let storage = connect_storage(&config).await?;
    tracing::info!(backend = storage.backend_name(), "Storage ready");

    let report = bootstrap::run(storage.as_ref(), &config.admin).await?;
    tracing::debug!(?report, "Bootstrap finished");

    let purged = storage.purge_expired_sessions(Utc::now()).await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired sessions");
    }

    let app = create_router(AppState::from_config(storage, &config));

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

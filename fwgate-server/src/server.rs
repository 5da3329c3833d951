//! Server state and the HTTP serve loop.

use crate::config::Config;
use crate::files::StaticFiles;
use crate::http;
use crate::store::ConfigStore;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Everything a request handler needs.
///
/// Immutable after startup: holds only paths, never document contents.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Source of the alias mapping and OTA policy.
    pub store: ConfigStore,
    /// Storage root for downloads.
    pub files: StaticFiles,
}

impl AppState {
    /// Create state from its parts.
    pub fn new(store: ConfigStore, files: StaticFiles) -> Self {
        Self { store, files }
    }

    /// Create state from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ConfigStore::new(&config.paths.mapping, &config.paths.ota_config),
            StaticFiles::new(&config.paths.static_dir),
        )
    }
}

/// Bind `bind_address` and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn run(state: Arc<AppState>, bind_address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    serve(listener, state).await
}

/// Serve on an already-bound listener until a shutdown signal arrives.
///
/// In-flight downloads are allowed to finish.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if !state.files.root().is_dir() {
        tracing::warn!(
            static_dir = %state.files.root().display(),
            "Storage root does not exist yet; downloads will fail until it is created"
        );
    }

    tracing::info!(
        address = %listener.local_addr()?,
        mapping = %state.store.mapping_path().display(),
        ota_config = %state.store.ota_config_path().display(),
        static_dir = %state.files.root().display(),
        "fwgate listening"
    );

    axum::serve(listener, http::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, draining connections");
}

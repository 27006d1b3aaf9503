//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use dropsend_core::{Config, ListenAddress};

/// Start the server on a TCP port or a Unix socket, with graceful shutdown.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    match config.listen() {
        ListenAddress::Tcp(port) => {
            let addr = format!("0.0.0.0:{}", port);
            tracing::info!(addr = %addr, "Starting server");

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Server ready and accepting connections");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        #[cfg(unix)]
        ListenAddress::Unix(path) => {
            use std::os::unix::fs::PermissionsExt;

            tracing::info!(socket = %path.display(), "Starting server");
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(socket = %path.display(), "Removed stale socket"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to remove stale socket {}", path.display())
                    })
                }
            }

            let listener = tokio::net::UnixListener::bind(path)
                .with_context(|| format!("Failed to bind {}", path.display()))?;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
                .await
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
            tracing::info!("Server ready and accepting connections");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        #[cfg(not(unix))]
        ListenAddress::Unix(path) => {
            anyhow::bail!(
                "Unix sockets are not supported on this platform: {}",
                path.display()
            );
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}

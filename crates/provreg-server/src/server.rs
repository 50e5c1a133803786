//! HTTPS listener lifecycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use provreg_core::RegistryConfig;
use tokio::signal;

use crate::router::build_router;
use crate::tls;

/// How long in-flight requests may run once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Load TLS material, then serve the registry until `handle` shuts it down.
///
/// TLS failures surface before the listener binds.
pub async fn run(config: Arc<RegistryConfig>, handle: Handle) -> Result<()> {
    let cert = config.cert_path();
    let key = config.key_path();
    let tls = tls::load_server_config(&cert, &key).context("TLS setup failed")?;

    let bind = config.bind;
    tracing::info!("Starting provider registry on https://{bind}");
    tracing::info!(
        "Provider: {}/{} v{}",
        config.namespace,
        config.provider,
        config.version
    );
    tracing::info!("Certificate: {}", cert.display());

    let app = build_router(config);
    axum_server::bind_rustls(bind, RustlsConfig::from_config(Arc::new(tls)))
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("Server on {bind} failed"))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then drain the server behind `handle`.
pub async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

//! HTTP transport
//!
//! Binds the router to a TCP listener via axum and serves until Ctrl-C.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use super::router;
use super::state::AppState;

/// Bind `addr` and serve the API until interrupted
pub async fn serve_http(addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve_on(listener, state).await
}

/// Serve the API on an already-bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    let local = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Listening on http://{}", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

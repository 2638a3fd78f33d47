//! HTTP server command handler

use anyhow::{Context, Result};

use crate::config::ServerConfig;
use crate::server::{self, AppState};

/// Load the classifier, then serve until Ctrl-C
pub fn run(config: &ServerConfig) -> Result<()> {
    let service = super::build_service(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    runtime.block_on(server::serve_http(config.bind(), AppState::new(service)))
}

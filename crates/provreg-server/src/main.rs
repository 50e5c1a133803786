//! provreg - private provider registry over HTTPS

use std::sync::Arc;

use anyhow::Result;
use axum_server::Handle;
use clap::Parser;
use provreg_server::{Cli, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Arc::new(Cli::parse().into_config());

    let handle = Handle::new();
    tokio::spawn(server::shutdown_on_signal(handle.clone()));

    server::run(config, handle).await
}

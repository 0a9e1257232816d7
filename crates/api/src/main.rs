//! LexSync - calendar reconciliation service
//!
//! Main entry point for the HTTP server and the cron scheduler.

use std::sync::Arc;

use anyhow::Context;
use lexsync_api::utils::logging::{init_tracing, LogFormat};
use lexsync_api::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; the environment alone is enough in production
    let dotenv = dotenvy::dotenv();
    init_tracing(LogFormat::from_env())?;
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    let config = lexsync_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application")?);
    ctx.start_scheduler().await.context("failed to start calendar sync scheduler")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "LexSync listening");

    axum::serve(listener, router(Arc::clone(&ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    ctx.shutdown().await;
    info!("LexSync stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

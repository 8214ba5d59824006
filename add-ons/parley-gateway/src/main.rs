//! Parley Gateway: HTTP front door for the voice interview.
//! `POST /inference` runs one turn; everything else is the static recorder UI.

mod error;
mod router;

use anyhow::Context;
use parley_core::{InterviewConfig, RequestOrchestrator};
use router::{build_router, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[parley-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = InterviewConfig::load().context("loading configuration")?;
    let orchestrator =
        Arc::new(RequestOrchestrator::from_config(&cfg).context("wiring voice backends")?);
    let notifier = orchestrator.notifier();

    let app = build_router(AppState { orchestrator }, &cfg.server.static_dir);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(target: "parley::gateway", "listening on {} (static: {})", addr, cfg.server.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router (and its orchestrator handle) is gone once serve returns.
    match Arc::try_unwrap(notifier) {
        Ok(notifier) => notifier.shutdown().await,
        Err(_) => tracing::warn!(target: "parley::gateway", "notifier still shared at exit; pending events dropped"),
    }
    tracing::info!(target: "parley::gateway", "shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "parley::gateway", "ctrl-c handler failed: {}", e);
    }
    tracing::info!(target: "parley::gateway", "shutdown requested");
}

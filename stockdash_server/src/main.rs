use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stockdash_lib::Store;
use stockdash_server::{app, build_dashboard, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stockdash=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    let store = Store::open(&cfg.db_path)
        .with_context(|| format!("opening price cache at {}", cfg.db_path.display()))?;
    store.init().context("initializing price cache")?;
    let store = Arc::new(store);
    tracing::info!(path = %cfg.db_path.display(), "price cache ready");

    let dashboard = build_dashboard(
        Arc::clone(&store),
        &cfg.chart_base_url,
        &cfg.csv_base_url,
        &cfg.sample_dir,
        cfg.provider_timeout(),
    )?;

    let router = app(Arc::new(dashboard), &cfg.static_dir, cfg.cors_origin.as_deref());

    let addr = cfg.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.persist().context("flushing price cache")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, stopping");
}

use std::sync::Arc;

use anyhow::Context;
use leakpath_core::ShipGrid;
use leakpath_service::config::Config;
use leakpath_service::{build_router, load_grid, spawn_ticker, AppState, ShipHost};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cfg = Config::from_env()?;
    let grid = match &cfg.grid_path {
        Some(path) => load_grid(path)?,
        None => ShipGrid::new("empty"),
    };
    let host = Arc::new(ShipHost::new(grid, cfg.options.clone()));
    let _ticker = spawn_ticker(Arc::clone(&host), cfg.tick);
    let app = build_router(AppState { host });

    tracing::info!(core_version=%leakpath_core::version(), addr=%cfg.addr(), tick_ms=cfg.tick.as_millis() as u64, "starting leakpath-service");
    let listener = tokio::net::TcpListener::bind(cfg.addr()).await.context("bind failed")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

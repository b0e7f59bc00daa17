use std::future::Future;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};
use service::runtime;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the router for the configured storage backend.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    // file backend: data directory is created here, before the first request
    let repo = runtime::build_repository(&cfg.storage).await?;
    Ok(routes::build_router(AppState::new(repo), build_cors()))
}

/// Public entry: build the app and run the HTTP server until `shutdown` resolves
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;

    // host:port from config
    let addr = cfg.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, storage = ?cfg.storage.backend, "starting quiz server");
    // stop accepting on shutdown and drain open connections
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("quiz server stopped");
    Ok(())
}

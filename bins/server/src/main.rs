//! Partida API Server
//!
//! Entry point for the bookkeeping backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partida_api::{AppState, create_router};
use partida_core::reports::{CommandRenderer, StoreConnection};
use partida_db::connect_with;
use partida_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partida=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let renderer = CommandRenderer::from_config(&config.reports);
    let report_store = config.reports.store.as_ref().map(StoreConnection::from);
    info!(
        templates_dir = %config.reports.templates_dir,
        store_backed = report_store.is_some(),
        "Report renderer configured"
    );

    let state = AppState {
        db: Arc::new(db),
        renderer: Arc::new(renderer),
        report_store,
        pagination: config.pagination,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

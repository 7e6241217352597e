//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for accounts, companies, journal entries and reports
//! - Request parsing helpers
//! - Error to response mapping

pub mod error;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use partida_core::reports::{ReportRenderer, StoreConnection};
use partida_shared::PaginationConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Renderer for PDF reports.
    pub renderer: Arc<dyn ReportRenderer>,
    /// Connection the renderer queries directly, when configured.
    pub report_store: Option<StoreConnection>,
    /// Page size defaults and limits for list endpoints.
    pub pagination: PaginationConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! Shared helpers for route tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use partida_core::reports::{
    RenderedReport, ReportError, ReportRenderer, ReportRequest, TemplateInfo,
};
use partida_db::migration::{Migrator, MigratorTrait};
use partida_shared::PaginationConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use crate::AppState;

static RENDER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Renderer that records requests and writes a fixed document.
#[derive(Default)]
pub(crate) struct StubRenderer {
    pub requests: Mutex<Vec<ReportRequest>>,
}

#[async_trait]
impl ReportRenderer for StubRenderer {
    async fn templates(&self) -> Result<Vec<TemplateInfo>, ReportError> {
        Ok(vec![TemplateInfo {
            name: "journal_entries".to_string(),
            file: "journal_entries.jasper".to_string(),
        }])
    }

    async fn render(&self, request: ReportRequest) -> Result<RenderedReport, ReportError> {
        if request.template != "journal_entries" {
            return Err(ReportError::TemplateNotFound(request.template));
        }
        self.requests.lock().unwrap().push(request);

        let n = RENDER_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path: PathBuf =
            std::env::temp_dir().join(format!("partida-api-test-{}-{n}.pdf", std::process::id()));
        tokio::fs::write(&path, b"%PDF-stub").await?;
        Ok(RenderedReport::new(path))
    }
}

async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// State backed by a fresh in-memory database and a stub renderer.
pub(crate) async fn test_state() -> AppState {
    test_state_with(Arc::new(StubRenderer::default())).await
}

pub(crate) async fn test_state_with(renderer: Arc<StubRenderer>) -> AppState {
    AppState {
        db: Arc::new(test_db().await),
        renderer,
        report_store: None,
        pagination: PaginationConfig::default(),
    }
}

/// Sends a request and returns the raw response parts.
pub(crate) async fn send_raw(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes)
}

/// Sends a request and decodes the JSON body (`Null` when empty).
pub(crate) async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub(crate) async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

//! Report request and result types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use partida_shared::ReportStoreConfig;
use serde::Serialize;

use super::error::ReportError;

/// Where a template reads its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    /// Rows passed to the renderer as a JSON document.
    Inline(serde_json::Value),
    /// Rows queried by the renderer over a live connection.
    Store(StoreConnection),
}

/// Live database connection handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConnection {
    /// Renderer database type flag (`generic`, `postgres`, ...).
    pub db_type: String,
    /// JDBC driver class.
    pub driver: String,
    /// JDBC URL.
    pub url: String,
    /// Database user.
    pub username: String,
    /// Database password.
    pub password: String,
}

impl From<&ReportStoreConfig> for StoreConnection {
    fn from(config: &ReportStoreConfig) -> Self {
        Self {
            db_type: config.db_type.clone(),
            driver: config.driver.clone(),
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

/// A single render invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Template name without extension.
    pub template: String,
    /// Template parameters, passed as `KEY=value`.
    pub parameters: BTreeMap<String, String>,
    /// Row source.
    pub source: ReportSource,
}

impl ReportRequest {
    /// Creates a request with no parameters.
    pub fn new(template: impl Into<String>, source: ReportSource) -> Self {
        Self {
            template: template.into(),
            parameters: BTreeMap::new(),
            source,
        }
    }

    /// Adds a template parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A compiled template available for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// Template name without extension.
    pub name: String,
    /// File name on disk.
    pub file: String,
}

/// A generated document on disk.
///
/// The file is temporary; [`RenderedReport::take_bytes`] reads and removes it.
#[derive(Debug)]
pub struct RenderedReport {
    path: PathBuf,
}

impl RenderedReport {
    /// Wraps a generated file.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the generated document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type of the generated document.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    /// Reads the document and deletes the temporary file.
    pub async fn take_bytes(self) -> Result<Vec<u8>, ReportError> {
        let bytes = tokio::fs::read(&self.path).await?;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove rendered report");
        }
        Ok(bytes)
    }
}

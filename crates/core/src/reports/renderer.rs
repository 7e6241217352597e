//! External report renderer.
//!
//! Templates are compiled `.jasper` files rendered to PDF by a
//! JasperStarter-compatible executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use partida_shared::ReportConfig;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ReportError;
use super::types::{RenderedReport, ReportRequest, ReportSource, StoreConnection, TemplateInfo};

/// Extension of compiled templates.
pub const TEMPLATE_EXTENSION: &str = "jasper";

/// Renders report templates into documents.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Lists the templates that can be rendered, sorted by name.
    async fn templates(&self) -> Result<Vec<TemplateInfo>, ReportError>;

    /// Renders a template and returns the generated document.
    async fn render(&self, request: ReportRequest) -> Result<RenderedReport, ReportError>;
}

/// Renderer that shells out to an external executable.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
    templates_dir: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
}

impl CommandRenderer {
    /// Creates a renderer.
    pub fn new(
        program: impl Into<PathBuf>,
        templates_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
            timeout,
        }
    }

    /// Creates a renderer from configuration.
    #[must_use]
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            &config.renderer_bin,
            &config.templates_dir,
            &config.output_dir,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Resolves a template name to its compiled file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplateName` for names that could escape the
    /// templates directory.
    pub fn template_path(&self, name: &str) -> Result<PathBuf, ReportError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ReportError::InvalidTemplateName(name.to_string()));
        }
        Ok(self
            .templates_dir
            .join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }

    /// Builds the renderer arguments.
    ///
    /// `data_file` must be set for inline sources.
    #[must_use]
    pub fn command_args(
        template: &Path,
        output: &Path,
        request: &ReportRequest,
        data_file: Option<&Path>,
    ) -> Vec<String> {
        let mut args = vec![
            "process".to_string(),
            template.display().to_string(),
            "-f".to_string(),
            "pdf".to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];

        if !request.parameters.is_empty() {
            args.push("-P".to_string());
            args.extend(request.parameters.iter().map(|(k, v)| format!("{k}={v}")));
        }

        match (&request.source, data_file) {
            (ReportSource::Inline(_), Some(file)) => {
                args.extend([
                    "-t".to_string(),
                    "json".to_string(),
                    "--data-file".to_string(),
                    file.display().to_string(),
                ]);
            }
            (ReportSource::Inline(_), None) => {}
            (ReportSource::Store(store), _) => args.extend(store_args(store)),
        }

        args
    }

    async fn run(&self, args: Vec<String>) -> Result<(), ReportError> {
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ReportError::RenderFailed(format!(
                    "cannot start {}: {e}",
                    self.program.display()
                ))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ReportError::Timeout(self.timeout.as_secs()))??;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ReportError::RenderFailed(format!(
                "renderer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "Report renderer wrote to stderr");
        }
        Ok(())
    }
}

/// Removes a file left by a render run. A missing file is not an error.
async fn remove_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove report artifact"),
    }
}

fn store_args(store: &StoreConnection) -> Vec<String> {
    vec![
        "-t".to_string(),
        store.db_type.clone(),
        "--db-driver".to_string(),
        store.driver.clone(),
        "--db-url".to_string(),
        store.url.clone(),
        "--db-user".to_string(),
        store.username.clone(),
        "--db-password".to_string(),
        store.password.clone(),
    ]
}

#[async_trait]
impl ReportRenderer for CommandRenderer {
    async fn templates(&self) -> Result<Vec<TemplateInfo>, ReportError> {
        let mut entries = match tokio::fs::read_dir(&self.templates_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let (Some(name), Some(file)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            templates.push(TemplateInfo {
                name: name.to_string(),
                file: file.to_string(),
            });
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn render(&self, request: ReportRequest) -> Result<RenderedReport, ReportError> {
        let template = self.template_path(&request.template)?;
        if !tokio::fs::try_exists(&template).await? {
            return Err(ReportError::TemplateNotFound(request.template.clone()));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let report_id = Uuid::new_v4();
        let output = self.output_dir.join(format!("{report_id}.pdf"));

        let data_file = match &request.source {
            ReportSource::Inline(data) => {
                let file = self.output_dir.join(format!("{report_id}_data.json"));
                tokio::fs::write(&file, serde_json::to_vec(data)?).await?;
                Some(file)
            }
            ReportSource::Store(_) => None,
        };

        let args = Self::command_args(&template, &output, &request, data_file.as_deref());
        debug!(template = %request.template, report_id = %report_id, "Running report renderer");

        let result = self.run(args).await;

        if let Some(file) = &data_file {
            remove_artifact(file).await;
        }
        if let Err(e) = result {
            remove_artifact(&output).await;
            return Err(e);
        }

        if !tokio::fs::try_exists(&output).await? {
            return Err(ReportError::RenderFailed(
                "renderer finished without producing a document".to_string(),
            ));
        }

        info!(template = %request.template, report_id = %report_id, "Report rendered");
        Ok(RenderedReport::new(output))
    }
}

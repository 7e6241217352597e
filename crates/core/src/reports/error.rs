//! Report error types.

use thiserror::Error;

/// Errors raised by the report renderer.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Template name contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid template name: {0}")]
    InvalidTemplateName(String),

    /// No compiled template with this name.
    #[error("Report template not found: {0}")]
    TemplateNotFound(String),

    /// The renderer exited unsuccessfully or produced no document.
    #[error("Report rendering failed: {0}")]
    RenderFailed(String),

    /// The renderer did not finish in time.
    #[error("Report rendering timed out after {0} seconds")]
    Timeout(u64),

    /// Filesystem or process I/O error.
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inline dataset could not be serialized.
    #[error("Report dataset serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTemplateName(_) => "INVALID_TEMPLATE_NAME",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::Timeout(_) => "RENDER_TIMEOUT",
            Self::Io(_) => "REPORT_IO_ERROR",
            Self::Serialization(_) => "REPORT_SERIALIZATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidTemplateName(_) => 400,
            Self::TemplateNotFound(_) => 404,
            Self::RenderFailed(_) | Self::Timeout(_) | Self::Io(_) | Self::Serialization(_) => 500,
        }
    }
}

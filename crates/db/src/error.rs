//! Repository error type.

use partida_core::ledger::LedgerError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error types for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Translates a unique-constraint violation into `on_unique`.
///
/// The store's constraints are the final arbiter for uniqueness; a
/// violation that slips past the pre-check is reported as the same domain
/// error the pre-check would have returned.
pub(crate) fn on_unique<F>(err: DbErr, on_unique: F) -> RepositoryError
where
    F: FnOnce() -> LedgerError,
{
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_unique().into(),
        _ => err.into(),
    }
}

/// Translates a foreign-key violation into `on_fk`.
pub(crate) fn on_foreign_key<F>(err: DbErr, on_fk: F) -> RepositoryError
where
    F: FnOnce() -> LedgerError,
{
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_fk().into(),
        _ => err.into(),
    }
}

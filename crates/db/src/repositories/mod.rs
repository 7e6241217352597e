//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod company;
pub mod journal;

pub use account::{
    AccountRepository, AccountWithParent, CreateAccountInput, ParentSummary, UpdateAccountInput,
};
pub use company::{CompanyRepository, CreateCompanyInput, UpdateCompanyInput};
pub use journal::{
    CreateEntryInput, EntryDetail, EntryFilter, JournalRepository, LineDetail, UpdateEntryInput,
};

use partida_core::ledger::{LedgerError, require_max_len, require_non_empty};
use sea_orm::DatabaseTransaction;
use tracing::error;

use crate::error::RepositoryResult;

/// Ends a transaction with the outcome of the work done inside it.
///
/// Commits on success. On failure the transaction is rolled back
/// explicitly before the original error is returned.
pub(crate) async fn finish<T>(
    txn: DatabaseTransaction,
    result: RepositoryResult<T>,
) -> RepositoryResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                error!(error = %rollback, "Failed to roll back transaction");
            }
            Err(e)
        }
    }
}

/// Trims required text and checks its length.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, LedgerError> {
    let value = require_non_empty(field, value)?;
    require_max_len(field, value, max)?;
    Ok(value.to_string())
}

/// Trims optional text, turning blank values into `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, LedgerError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    require_max_len(field, value, max)?;
    Ok(Some(value.to_string()))
}

//! Ledger error types for validation and state errors.
//!
//! One taxonomy covers the account hierarchy, the journal entry aggregate
//! and the posting workflow. Every variant except `StoreUnavailable` is a
//! caller error and carries the offending value in its message.

use partida_shared::types::{AccountId, CompanyId, EntryId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: i32,
    },

    // ========== Uniqueness Errors ==========
    /// Account code already exists.
    #[error("Account code {0} already exists")]
    DuplicateCode(i32),

    /// Entry number already used by the company.
    #[error("Entry number '{entry_number}' already exists for company {company_id}")]
    DuplicateEntryNumber {
        /// The company owning the entry.
        company_id: CompanyId,
        /// The colliding entry number.
        entry_number: String,
    },

    /// Company tax ID already registered.
    #[error("Tax ID '{0}' is already registered")]
    DuplicateTaxId(String),

    // ========== Hierarchy Errors ==========
    /// Parent account does not exist.
    #[error("Parent account not found: {0}")]
    InvalidParent(AccountId),

    /// Account cannot be its own parent.
    #[error("Account {0} cannot be its own parent")]
    SelfParent(AccountId),

    /// Parent assignment would create a cycle.
    #[error("Assigning parent {parent_id} to account {account_id} would create a cycle")]
    Cycle {
        /// The account being re-parented.
        account_id: AccountId,
        /// The requested parent.
        parent_id: AccountId,
    },

    /// Account still has child accounts.
    #[error("Account {0} has child accounts and cannot be deleted")]
    HasChildren(AccountId),

    /// Entity is referenced by journal entries.
    #[error("{entity} {id} is referenced by journal entries and cannot be deleted")]
    InUse {
        /// Kind of entity being deleted.
        entity: &'static str,
        /// The identifier being deleted.
        id: i32,
    },

    // ========== Line Errors ==========
    /// Line references an account that does not exist.
    #[error("Account not found: {0}")]
    UnknownAccount(AccountId),

    /// Line references a summary account.
    #[error("Account {code} (id {account_id}) is not postable")]
    AccountNotPostable {
        /// The account ID.
        account_id: AccountId,
        /// The account code.
        code: i32,
    },

    /// Entry debits and credits differ by more than the tolerance.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== State Errors ==========
    /// Entry has been posted and is immutable.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(EntryId),

    /// Field-level validation failure.
    #[error("Invalid {field}: {reason}")]
    ValidationFailed {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    // ========== Infrastructure Errors ==========
    /// The store failed unexpectedly.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    /// Journal entry not found.
    #[must_use]
    pub const fn entry_not_found(id: EntryId) -> Self {
        Self::NotFound {
            entity: "Journal entry",
            id: id.0,
        }
    }

    /// Account not found.
    #[must_use]
    pub const fn account_not_found(id: AccountId) -> Self {
        Self::NotFound {
            entity: "Account",
            id: id.0,
        }
    }

    /// Company not found.
    #[must_use]
    pub const fn company_not_found(id: CompanyId) -> Self {
        Self::NotFound {
            entity: "Company",
            id: id.0,
        }
    }

    /// Field-level validation failure.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::DuplicateEntryNumber { .. } => "DUPLICATE_ENTRY_NUMBER",
            Self::DuplicateTaxId(_) => "DUPLICATE_TAX_ID",
            Self::InvalidParent(_) => "INVALID_PARENT",
            Self::SelfParent(_) => "SELF_PARENT",
            Self::Cycle { .. } => "PARENT_CYCLE",
            Self::HasChildren(_) => "HAS_CHILDREN",
            Self::InUse { .. } => "IN_USE",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::AccountNotPostable { .. } => "ACCOUNT_NOT_POSTABLE",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::NotFound { .. } => 404,

            // 500 Internal Server Error
            Self::StoreUnavailable(_) => 500,

            // 400 Bad Request - every domain rule violation
            Self::DuplicateCode(_)
            | Self::DuplicateEntryNumber { .. }
            | Self::DuplicateTaxId(_)
            | Self::InvalidParent(_)
            | Self::SelfParent(_)
            | Self::Cycle { .. }
            | Self::HasChildren(_)
            | Self::InUse { .. }
            | Self::UnknownAccount(_)
            | Self::AccountNotPostable { .. }
            | Self::Unbalanced { .. }
            | Self::AlreadyPosted(_)
            | Self::ValidationFailed { .. } => 400,
        }
    }
}

//! Double-entry bookkeeping logic.
//!
//! This module implements the journal entry aggregate:
//! - Entry types and the pending/posted status machine
//! - Line validation and balance calculation
//! - Field-level validation helpers
//! - Per-status summaries
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod summary;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::{AccountInfo, LedgerService};
pub use summary::{StatusSummary, summarize};
pub use types::{BALANCE_TOLERANCE, EntryStatus, EntryTotals, EntryType, LineInput};
pub use validation::{
    MAX_AMOUNT, normalize_amount, parse_entry_date, parse_entry_type, parse_postable,
    parse_status, require_lines, require_max_amount, require_max_len, require_non_empty,
    require_non_negative,
};

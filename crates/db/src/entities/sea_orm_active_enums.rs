//! String-backed enums stored on journal headers.

use partida_core::ledger;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored journal entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EntryType {
    /// Manual entry.
    #[sea_orm(string_value = "Manual")]
    Manual,
    /// Purchase entry.
    #[sea_orm(string_value = "Purchase")]
    Purchase,
    /// Sale entry.
    #[sea_orm(string_value = "Sale")]
    Sale,
    /// Adjustment entry.
    #[sea_orm(string_value = "Adjustment")]
    Adjustment,
}

/// Stored journal entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EntryStatus {
    /// Open for edits.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Posted and immutable.
    #[sea_orm(string_value = "posted")]
    Posted,
}

impl From<ledger::EntryType> for EntryType {
    fn from(value: ledger::EntryType) -> Self {
        match value {
            ledger::EntryType::Manual => Self::Manual,
            ledger::EntryType::Purchase => Self::Purchase,
            ledger::EntryType::Sale => Self::Sale,
            ledger::EntryType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<EntryType> for ledger::EntryType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Manual => Self::Manual,
            EntryType::Purchase => Self::Purchase,
            EntryType::Sale => Self::Sale,
            EntryType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<ledger::EntryStatus> for EntryStatus {
    fn from(value: ledger::EntryStatus) -> Self {
        match value {
            ledger::EntryStatus::Pending => Self::Pending,
            ledger::EntryStatus::Posted => Self::Posted,
        }
    }
}

impl From<EntryStatus> for ledger::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Posted => Self::Posted,
        }
    }
}

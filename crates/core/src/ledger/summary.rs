//! Per-status totals for a company's journal entries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{EntryStatus, EntryTotals};

/// Aggregated totals for one status group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// The status shared by the group.
    pub status: EntryStatus,
    /// Number of entries in the group.
    pub count: u64,
    /// Sum of header total debits.
    pub total_debit: Decimal,
    /// Sum of header total credits.
    pub total_credit: Decimal,
}

/// Folds header rows into one summary per status present.
///
/// Groups are ordered pending first, then posted. Statuses without entries
/// are omitted.
pub fn summarize<I>(rows: I) -> Vec<StatusSummary>
where
    I: IntoIterator<Item = (EntryStatus, EntryTotals)>,
{
    let mut groups: BTreeMap<EntryStatus, StatusSummary> = BTreeMap::new();

    for (status, totals) in rows {
        let group = groups.entry(status).or_insert_with(|| StatusSummary {
            status,
            count: 0,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
        });
        group.count += 1;
        group.total_debit += totals.total_debit;
        group.total_credit += totals.total_credit;
    }

    groups.into_values().collect()
}

//! Journal entry domain types.
//!
//! This module defines the header classification, the two-state status
//! machine, line inputs and the debit/credit totals of an entry.

use partida_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum |debit - credit| for an entry to count as balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Journal entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// General manual entry.
    Manual,
    /// Purchase entry.
    Purchase,
    /// Sale entry.
    Sale,
    /// Adjustment entry.
    Adjustment,
}

impl EntryType {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Purchase => "Purchase",
            Self::Sale => "Sale",
            Self::Adjustment => "Adjustment",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal entry status.
///
/// `Pending` is the only state that allows edits and deletion.
/// `finalize` is the single legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is open for edits.
    Pending,
    /// Entry has been posted (immutable).
    Posted,
}

impl EntryStatus {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
        }
    }

    /// Returns true if the entry can be modified or deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the state after finalization, or `None` if already posted.
    #[must_use]
    pub const fn finalize(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Posted),
            Self::Posted => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for a single journal line.
///
/// Debit and credit are independent amounts; a line may carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

impl LineInput {
    /// Creates a line with no memo.
    #[must_use]
    pub const fn new(account_id: AccountId, debit: Decimal, credit: Decimal) -> Self {
        Self {
            account_id,
            debit,
            credit,
            memo: None,
        }
    }
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub const fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
        }
    }

    /// Sums the debits and credits of a set of lines, or `None` on overflow.
    #[must_use]
    pub fn from_lines(lines: &[LineInput]) -> Option<Self> {
        Self::from_amounts(lines.iter().map(|l| (l.debit, l.credit)))
    }

    /// Sums `(debit, credit)` pairs, or `None` if either total overflows.
    #[must_use]
    pub fn from_amounts<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        amounts
            .into_iter()
            .try_fold(Self::default(), |acc, (debit, credit)| {
                Some(Self::new(
                    acc.total_debit.checked_add(debit)?,
                    acc.total_credit.checked_add(credit)?,
                ))
            })
    }

    /// Returns total debit minus total credit.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    /// Returns true if the difference is within [`BALANCE_TOLERANCE`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference().abs() <= BALANCE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(EntryStatus::Pending.finalize(), Some(EntryStatus::Posted));
        assert_eq!(EntryStatus::Posted.finalize(), None);
        assert!(EntryStatus::Pending.is_editable());
        assert!(!EntryStatus::Posted.is_editable());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&EntryStatus::Posted).unwrap(),
            "\"posted\""
        );
        assert_eq!(
            serde_json::to_string(&EntryType::Purchase).unwrap(),
            "\"Purchase\""
        );
    }

    #[test]
    fn test_totals_within_tolerance() {
        let totals = EntryTotals::new(dec!(100.00), dec!(99.99));
        assert!(totals.is_balanced());
        assert_eq!(totals.difference(), dec!(0.01));

        let totals = EntryTotals::new(dec!(100.00), dec!(99.98));
        assert!(!totals.is_balanced());
    }

    #[test]
    fn test_totals_from_lines() {
        let lines = vec![
            LineInput::new(AccountId(1), dec!(1000), dec!(0)),
            LineInput::new(AccountId(2), dec!(0), dec!(600)),
            LineInput::new(AccountId(3), dec!(0), dec!(400)),
        ];
        let totals = EntryTotals::from_lines(&lines).unwrap();
        assert_eq!(totals.total_debit, dec!(1000));
        assert_eq!(totals.total_credit, dec!(1000));
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_totals_overflow_is_none() {
        let lines = vec![
            LineInput::new(AccountId(1), Decimal::MAX, dec!(0)),
            LineInput::new(AccountId(1), Decimal::MAX, dec!(0)),
            LineInput::new(AccountId(2), dec!(0), Decimal::MAX),
        ];
        assert_eq!(EntryTotals::from_lines(&lines), None);
        assert_eq!(
            EntryTotals::from_amounts([(dec!(1), Decimal::MAX), (dec!(1), dec!(1))]),
            None
        );
    }
}

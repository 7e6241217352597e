//! Ledger service for journal entry validation.
//!
//! This module holds the posting rules that run before anything is
//! written: line validation, totals, the balance check and the status
//! guards for update, delete and finalize.

use partida_shared::types::{AccountId, EntryId};

use super::error::LedgerError;
use super::types::{EntryStatus, EntryTotals, LineInput};
use super::validation::{
    normalize_amount, require_lines, require_max_amount, require_non_negative,
};

/// Information about an account needed for line validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// The account code.
    pub code: i32,
    /// Whether the account accepts journal lines.
    pub postable: bool,
}

/// Ledger service for journal entry validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validate a line set before persisting.
    ///
    /// 1. Requires at least one line
    /// 2. Rejects negative amounts and rounds the rest to 2 places
    /// 3. Rejects amounts above [`MAX_AMOUNT`](super::validation::MAX_AMOUNT)
    /// 4. Resolves each account (`UnknownAccount`, `AccountNotPostable`)
    /// 5. Sums debits and credits, rejecting totals above the same maximum
    /// 6. Rejects the set if it is not balanced within 0.01
    ///
    /// # Returns
    ///
    /// The normalized lines and their totals.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` on the first failing line or an unbalanced set.
    pub fn validate_lines<A>(
        lines: &[LineInput],
        account_lookup: A,
    ) -> Result<(Vec<LineInput>, EntryTotals), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        require_lines(lines)?;

        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            resolved.push(Self::resolve_line(line, &account_lookup)?);
        }

        let totals = Self::totals(&resolved)?;
        Self::ensure_balanced(&totals)?;

        Ok((resolved, totals))
    }

    fn resolve_line<A>(line: &LineInput, account_lookup: &A) -> Result<LineInput, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        require_non_negative("debit", line.debit)?;
        require_non_negative("credit", line.credit)?;
        let debit = normalize_amount(line.debit);
        let credit = normalize_amount(line.credit);
        require_max_amount("debit", debit)?;
        require_max_amount("credit", credit)?;

        let account =
            account_lookup(line.account_id).ok_or(LedgerError::UnknownAccount(line.account_id))?;
        if !account.postable {
            return Err(LedgerError::AccountNotPostable {
                account_id: account.id,
                code: account.code,
            });
        }

        Ok(LineInput {
            account_id: line.account_id,
            debit,
            credit,
            memo: line
                .memo
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ToString::to_string),
        })
    }

    /// Sum line amounts into totals that fit a stored amount.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` naming `total_debit` or `total_credit`.
    pub fn totals(lines: &[LineInput]) -> Result<EntryTotals, LedgerError> {
        let totals = EntryTotals::from_lines(lines).ok_or_else(|| {
            LedgerError::validation("lines", "line amounts overflow the entry totals")
        })?;
        require_max_amount("total_debit", totals.total_debit)?;
        require_max_amount("total_credit", totals.total_credit)?;
        Ok(totals)
    }

    /// Validate that totals balance within the tolerance.
    ///
    /// # Errors
    ///
    /// Returns `Unbalanced` with both totals.
    pub fn ensure_balanced(totals: &EntryTotals) -> Result<(), LedgerError> {
        if totals.is_balanced() {
            Ok(())
        } else {
            Err(LedgerError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
            })
        }
    }

    /// Validate that an entry can be modified.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPosted` if the entry is posted.
    pub fn validate_can_modify(id: EntryId, status: EntryStatus) -> Result<(), LedgerError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(LedgerError::AlreadyPosted(id))
        }
    }

    /// Validate that an entry can be deleted.
    ///
    /// Only pending entries can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPosted` if the entry is posted.
    pub fn validate_can_delete(id: EntryId, status: EntryStatus) -> Result<(), LedgerError> {
        Self::validate_can_modify(id, status)
    }

    /// Validate the pending to posted transition.
    ///
    /// The balance is checked against the stored totals at the time of the
    /// call, not trusted from creation.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPosted` or `Unbalanced`.
    pub fn finalize(
        id: EntryId,
        status: EntryStatus,
        totals: &EntryTotals,
    ) -> Result<EntryStatus, LedgerError> {
        let next = status.finalize().ok_or(LedgerError::AlreadyPosted(id))?;
        Self::ensure_balanced(totals)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn postable(id: AccountId) -> Option<AccountInfo> {
        Some(AccountInfo {
            id,
            code: id.0 * 100,
            postable: true,
        })
    }

    fn line(account: i32, debit: Decimal, credit: Decimal) -> LineInput {
        LineInput::new(AccountId(account), debit, credit)
    }

    #[test]
    fn test_validate_balanced_lines() {
        let lines = vec![line(1, dec!(1000), dec!(0)), line(2, dec!(0), dec!(1000))];

        let (resolved, totals) = LedgerService::validate_lines(&lines, postable).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(totals.total_debit, dec!(1000));
        assert_eq!(totals.total_credit, dec!(1000));
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_validate_within_tolerance() {
        let lines = vec![line(1, dec!(100.00), dec!(0)), line(2, dec!(0), dec!(99.99))];
        assert!(LedgerService::validate_lines(&lines, postable).is_ok());
    }

    #[test]
    fn test_validate_unbalanced_lines() {
        let lines = vec![line(1, dec!(100), dec!(0)), line(2, dec!(0), dec!(50))];

        let result = LedgerService::validate_lines(&lines, postable);

        assert!(matches!(
            result,
            Err(LedgerError::Unbalanced { debit, credit }) if debit == dec!(100) && credit == dec!(50)
        ));
    }

    #[test]
    fn test_validate_no_lines() {
        let result = LedgerService::validate_lines(&[], postable);
        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "lines", .. })
        ));
    }

    #[test]
    fn test_validate_amount_above_column_range() {
        let lines = vec![
            line(1, dec!(100000000000000), dec!(0)),
            line(2, dec!(0), dec!(100000000000000)),
        ];

        let result = LedgerService::validate_lines(&lines, postable);

        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "debit", .. })
        ));
    }

    #[test]
    fn test_validate_rounding_past_maximum() {
        let lines = vec![
            line(1, dec!(0), dec!(0)),
            line(2, dec!(0), dec!(9999999999999.999)),
        ];

        let result = LedgerService::validate_lines(&lines, postable);

        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "credit", .. })
        ));
    }

    #[test]
    fn test_validate_totals_above_maximum() {
        let big = dec!(6000000000000);
        let lines = vec![
            line(1, big, dec!(0)),
            line(1, big, dec!(0)),
            line(2, dec!(0), big),
            line(2, dec!(0), big),
        ];

        let result = LedgerService::validate_lines(&lines, postable);

        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "total_debit", .. })
        ));
    }

    #[test]
    fn test_validate_overflowing_amounts_do_not_panic() {
        let lines = vec![
            line(1, Decimal::MAX, dec!(0)),
            line(1, Decimal::MAX, dec!(0)),
            line(2, dec!(0), Decimal::MAX),
        ];

        let result = LedgerService::validate_lines(&lines, postable);

        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "debit", .. })
        ));
        assert!(LedgerService::totals(&lines).is_err());
    }

    #[test]
    fn test_validate_unknown_account() {
        let lines = vec![line(1, dec!(10), dec!(0)), line(99, dec!(0), dec!(10))];

        let result = LedgerService::validate_lines(&lines, |id| {
            if id == AccountId(99) { None } else { postable(id) }
        });

        assert!(matches!(result, Err(LedgerError::UnknownAccount(AccountId(99)))));
    }

    #[test]
    fn test_validate_account_not_postable() {
        let lines = vec![line(1, dec!(10), dec!(0)), line(2, dec!(0), dec!(10))];

        let result = LedgerService::validate_lines(&lines, |id| {
            Some(AccountInfo {
                id,
                code: 200,
                postable: id != AccountId(2),
            })
        });

        assert!(matches!(
            result,
            Err(LedgerError::AccountNotPostable {
                account_id: AccountId(2),
                code: 200
            })
        ));
    }

    #[test]
    fn test_validate_negative_amount() {
        let lines = vec![line(1, dec!(-10), dec!(0)), line(2, dec!(0), dec!(-10))];
        let result = LedgerService::validate_lines(&lines, postable);
        assert!(matches!(
            result,
            Err(LedgerError::ValidationFailed { field: "debit", .. })
        ));
    }

    #[test]
    fn test_validate_rounds_and_trims() {
        let mut first = line(1, dec!(10.005), dec!(0));
        first.memo = Some("  ".to_string());
        let mut second = line(2, dec!(0), dec!(10.00));
        second.memo = Some(" rent ".to_string());

        let (resolved, totals) =
            LedgerService::validate_lines(&[first, second], postable).unwrap();

        assert_eq!(resolved[0].debit, dec!(10.00));
        assert_eq!(resolved[0].memo, None);
        assert_eq!(resolved[1].memo.as_deref(), Some("rent"));
        assert_eq!(totals.total_debit, dec!(10.00));
    }

    #[test]
    fn test_validate_can_modify() {
        assert!(LedgerService::validate_can_modify(EntryId(1), EntryStatus::Pending).is_ok());
        assert!(matches!(
            LedgerService::validate_can_modify(EntryId(1), EntryStatus::Posted),
            Err(LedgerError::AlreadyPosted(EntryId(1)))
        ));
        assert!(matches!(
            LedgerService::validate_can_delete(EntryId(2), EntryStatus::Posted),
            Err(LedgerError::AlreadyPosted(EntryId(2)))
        ));
    }

    #[test]
    fn test_finalize() {
        let balanced = EntryTotals::new(dec!(50), dec!(50));
        let unbalanced = EntryTotals::new(dec!(50), dec!(40));

        assert_eq!(
            LedgerService::finalize(EntryId(1), EntryStatus::Pending, &balanced).unwrap(),
            EntryStatus::Posted
        );
        assert!(matches!(
            LedgerService::finalize(EntryId(1), EntryStatus::Posted, &balanced),
            Err(LedgerError::AlreadyPosted(_))
        ));
        assert!(matches!(
            LedgerService::finalize(EntryId(1), EntryStatus::Pending, &unbalanced),
            Err(LedgerError::Unbalanced { .. })
        ));
    }
}

//! Property-based tests for LedgerService.
//!
//! - Balance integrity: balanced sets pass, sets off by more than 0.01 fail
//! - Totals equal the line sums
//! - Status machine: posted never reverts and rejects every mutation

use proptest::prelude::*;
use rust_decimal::Decimal;
use partida_shared::types::{AccountId, EntryId};

use super::error::LedgerError;
use super::service::{AccountInfo, LedgerService};
use super::types::{EntryStatus, EntryTotals, LineInput};

/// Strategy to generate non-negative amounts with cents (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive amounts with cents (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an entry status.
fn status_strategy() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![Just(EntryStatus::Pending), Just(EntryStatus::Posted)]
}

/// Account lookup where every account is postable.
fn postable_lookup(id: AccountId) -> Option<AccountInfo> {
    Some(AccountInfo {
        id,
        code: id.0,
        postable: true,
    })
}

/// Builds one debit line per amount and a single balancing credit line.
fn balanced_lines(debits: &[Decimal]) -> Vec<LineInput> {
    let mut lines: Vec<LineInput> = debits
        .iter()
        .enumerate()
        .map(|(i, d)| LineInput::new(AccountId(i32::try_from(i).unwrap() + 1), *d, Decimal::ZERO))
        .collect();
    let total: Decimal = debits.iter().copied().sum();
    lines.push(LineInput::new(AccountId(1000), Decimal::ZERO, total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of debit lines offset by one equal credit line,
    /// validation SHALL succeed and the totals SHALL equal the line sums.
    #[test]
    fn prop_balanced_lines_accepted(
        debits in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let lines = balanced_lines(&debits);
        let expected: Decimal = debits.iter().copied().sum();

        let result = LedgerService::validate_lines(&lines, postable_lookup);

        prop_assert!(result.is_ok(), "Balanced lines should be accepted");
        let (resolved, totals) = result.unwrap();
        prop_assert_eq!(resolved.len(), lines.len());
        prop_assert_eq!(totals.total_debit, expected);
        prop_assert_eq!(totals.total_credit, expected);
        prop_assert_eq!(totals.difference(), Decimal::ZERO);
    }

    /// *For any* pair of amounts that differ by more than 0.01,
    /// validation SHALL fail with `Unbalanced`.
    #[test]
    fn prop_unbalanced_lines_rejected(
        debit in amount(),
        credit in amount(),
    ) {
        prop_assume!((debit - credit).abs() > Decimal::new(1, 2));

        let lines = vec![
            LineInput::new(AccountId(1), debit, Decimal::ZERO),
            LineInput::new(AccountId(2), Decimal::ZERO, credit),
        ];

        let result = LedgerService::validate_lines(&lines, postable_lookup);

        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "Unbalanced lines should be rejected"
        );
    }

    /// *For any* line carrying both a debit and a credit, totals SHALL
    /// count each side independently.
    #[test]
    fn prop_two_sided_lines_sum_independently(
        a in amount(),
        b in amount(),
    ) {
        let lines = vec![
            LineInput::new(AccountId(1), a, b),
            LineInput::new(AccountId(2), b, a),
        ];

        let (_, totals) = LedgerService::validate_lines(&lines, postable_lookup).unwrap();

        prop_assert_eq!(totals.total_debit, a + b);
        prop_assert_eq!(totals.total_credit, a + b);
    }

    /// *For any* line set with one non-postable account, validation SHALL
    /// fail regardless of balance.
    #[test]
    fn prop_non_postable_account_rejected(
        debits in prop::collection::vec(positive_amount(), 1..5),
    ) {
        let lines = balanced_lines(&debits);

        let result = LedgerService::validate_lines(&lines, |id| {
            Some(AccountInfo { id, code: id.0, postable: id != AccountId(1000) })
        });

        let is_not_postable = matches!(
            result,
            Err(LedgerError::AccountNotPostable { account_id: AccountId(1000), .. })
        );
        prop_assert!(is_not_postable);
    }

    /// *For any* status and totals, a posted entry SHALL never finalize,
    /// update or delete.
    #[test]
    fn prop_posted_is_terminal(
        debit in amount(),
        credit in amount(),
    ) {
        let totals = EntryTotals::new(debit, credit);
        let id = EntryId(1);

        let finalize_posted = matches!(
            LedgerService::finalize(id, EntryStatus::Posted, &totals),
            Err(LedgerError::AlreadyPosted(_))
        );
        prop_assert!(finalize_posted);
        prop_assert!(LedgerService::validate_can_modify(id, EntryStatus::Posted).is_err());
        prop_assert!(LedgerService::validate_can_delete(id, EntryStatus::Posted).is_err());
    }

    /// *For any* pending entry, finalize SHALL succeed exactly when the
    /// totals balance within 0.01.
    #[test]
    fn prop_finalize_requires_balance(
        status in status_strategy(),
        debit in amount(),
        credit in amount(),
    ) {
        let totals = EntryTotals::new(debit, credit);
        let result = LedgerService::finalize(EntryId(7), status, &totals);

        match status {
            EntryStatus::Posted => prop_assert!(result.is_err()),
            EntryStatus::Pending => {
                prop_assert_eq!(result.is_ok(), totals.is_balanced());
                if let Ok(next) = result {
                    prop_assert_eq!(next, EntryStatus::Posted);
                }
            }
        }
    }
}

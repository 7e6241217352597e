//! Parent assignment and deletion rules for the account hierarchy.

use std::collections::HashSet;

use partida_shared::types::AccountId;

use crate::ledger::LedgerError;

/// Validates a parent assignment.
///
/// `account_id` is `None` when the account is being created. `parent_of`
/// returns `None` for an unknown account and `Some(parent)` otherwise.
///
/// # Errors
///
/// - `SelfParent` if the account would become its own parent
/// - `InvalidParent` if the parent does not exist
/// - `Cycle` if the account is already an ancestor of the parent
pub fn validate_parent<F>(
    account_id: Option<AccountId>,
    parent_id: AccountId,
    parent_of: F,
) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> Option<Option<AccountId>>,
{
    if account_id == Some(parent_id) {
        return Err(LedgerError::SelfParent(parent_id));
    }

    let mut next = parent_of(parent_id).ok_or(LedgerError::InvalidParent(parent_id))?;

    let Some(account_id) = account_id else {
        return Ok(());
    };

    let mut seen = HashSet::from([parent_id]);
    while let Some(ancestor) = next {
        if ancestor == account_id {
            return Err(LedgerError::Cycle {
                account_id,
                parent_id,
            });
        }
        // stored data already loops; stop walking
        if !seen.insert(ancestor) {
            break;
        }
        next = parent_of(ancestor).flatten();
    }

    Ok(())
}

/// Validates that an account can be deleted.
///
/// # Errors
///
/// `HasChildren` if any account points at it, `InUse` if any journal line
/// references it.
pub fn ensure_deletable(
    account_id: AccountId,
    child_count: u64,
    line_count: u64,
) -> Result<(), LedgerError> {
    if child_count > 0 {
        return Err(LedgerError::HasChildren(account_id));
    }
    if line_count > 0 {
        return Err(LedgerError::InUse {
            entity: "Account",
            id: account_id.0,
        });
    }
    Ok(())
}

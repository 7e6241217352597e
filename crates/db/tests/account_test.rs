//! Integration tests for the account repository.

mod common;

use common::{Fixture, account_input, entry, line};
use partida_core::ledger::LedgerError;
use partida_db::RepositoryError;
use partida_db::repositories::UpdateAccountInput;
use partida_shared::types::{AccountId, PageRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ledger_err<T: std::fmt::Debug>(result: Result<T, RepositoryError>) -> LedgerError {
    match result {
        Err(RepositoryError::Ledger(e)) => e,
        other => panic!("expected ledger error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_and_get_with_parent() {
    let fx = Fixture::new().await;
    let root = fx.account(1, false, None).await;
    let child = fx.account(100, true, Some(root)).await;

    let found = fx.accounts.get(child).await.unwrap();

    assert_eq!(found.account.code, 100);
    assert_eq!(found.account.currency.as_deref(), Some("USD"));
    let parent = found.parent.unwrap();
    assert_eq!(parent.id, root);
    assert_eq!(parent.code, 1);
    assert_eq!(parent.name, "Account 1");
}

#[tokio::test]
async fn test_create_trims_and_blanks_text() {
    let fx = Fixture::new().await;
    let mut input = account_input(10, true, None);
    input.name = "  Cash  ".to_string();
    input.description = Some("   ".to_string());

    let account = fx.accounts.create(input).await.unwrap();

    assert_eq!(account.name, "Cash");
    assert_eq!(account.description, None);
}

#[tokio::test]
async fn test_create_duplicate_code() {
    let fx = Fixture::new().await;
    fx.account(100, true, None).await;

    let err = ledger_err(fx.accounts.create(account_input(100, true, None)).await);

    assert!(matches!(err, LedgerError::DuplicateCode(100)));
}

#[tokio::test]
async fn test_create_with_missing_parent() {
    let fx = Fixture::new().await;

    let err = ledger_err(
        fx.accounts
            .create(account_input(100, true, Some(AccountId(55))))
            .await,
    );

    assert!(matches!(err, LedgerError::InvalidParent(AccountId(55))));
}

#[tokio::test]
async fn test_create_rejects_long_name() {
    let fx = Fixture::new().await;
    let mut input = account_input(100, true, None);
    input.name = "x".repeat(51);

    let err = ledger_err(fx.accounts.create(input).await);

    assert!(matches!(err, LedgerError::ValidationFailed { field: "name", .. }));
}

#[tokio::test]
async fn test_update_fields() {
    let fx = Fixture::new().await;
    let root = fx.account(1, false, None).await;
    let id = fx.account(100, true, None).await;

    let updated = fx
        .accounts
        .update(
            id,
            UpdateAccountInput {
                name: Some("Petty cash".to_string()),
                code: Some(101),
                currency: Some(None),
                parent_id: Some(Some(root)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Petty cash");
    assert_eq!(updated.code, 101);
    assert_eq!(updated.currency, None);
    assert_eq!(updated.parent_id, Some(root.0));
}

#[tokio::test]
async fn test_update_rules() {
    let fx = Fixture::new().await;
    let a = fx.account(1, false, None).await;
    let b = fx.account(2, false, Some(a)).await;
    let c = fx.account(3, true, Some(b)).await;

    let err = ledger_err(
        fx.accounts
            .update(
                c,
                UpdateAccountInput {
                    code: Some(1),
                    ..Default::default()
                },
            )
            .await,
    );
    assert!(matches!(err, LedgerError::DuplicateCode(1)));

    let err = ledger_err(
        fx.accounts
            .update(
                a,
                UpdateAccountInput {
                    parent_id: Some(Some(a)),
                    ..Default::default()
                },
            )
            .await,
    );
    assert!(matches!(err, LedgerError::SelfParent(_)));

    let err = ledger_err(
        fx.accounts
            .update(
                a,
                UpdateAccountInput {
                    parent_id: Some(Some(c)),
                    ..Default::default()
                },
            )
            .await,
    );
    assert!(matches!(err, LedgerError::Cycle { .. }));

    let err = ledger_err(
        fx.accounts
            .update(
                b,
                UpdateAccountInput {
                    parent_id: Some(Some(AccountId(404))),
                    ..Default::default()
                },
            )
            .await,
    );
    assert!(matches!(err, LedgerError::InvalidParent(AccountId(404))));

    let err = ledger_err(
        fx.accounts
            .update(AccountId(404), UpdateAccountInput::default())
            .await,
    );
    assert!(matches!(err, LedgerError::NotFound { id: 404, .. }));

    // detaching from a parent is always allowed
    let detached = fx
        .accounts
        .update(
            b,
            UpdateAccountInput {
                parent_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(detached.parent_id, None);
}

#[tokio::test]
async fn test_delete_guards() {
    let fx = Fixture::new().await;
    let company = fx.company("A-1").await;
    let root = fx.account(1, false, None).await;
    let cash = fx.account(100, true, Some(root)).await;
    let revenue = fx.account(200, true, Some(root)).await;
    let spare = fx.account(300, true, Some(root)).await;

    fx.journal
        .create(entry(
            company,
            "E-001",
            vec![
                line(cash, dec!(10), Decimal::ZERO),
                line(revenue, Decimal::ZERO, dec!(10)),
            ],
        ))
        .await
        .unwrap();

    let err = ledger_err(fx.accounts.delete(root).await);
    assert!(matches!(err, LedgerError::HasChildren(id) if id == root));

    let err = ledger_err(fx.accounts.delete(cash).await);
    assert!(matches!(err, LedgerError::InUse { entity: "Account", .. }));

    fx.accounts.get(root).await.unwrap();
    fx.accounts.get(cash).await.unwrap();

    fx.accounts.delete(spare).await.unwrap();
    let err = ledger_err(fx.accounts.get(spare).await);
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn test_list_pages_by_code() {
    let fx = Fixture::new().await;
    let root = fx.account(1, false, None).await;
    for code in [300, 100, 200] {
        fx.account(code, true, Some(root)).await;
    }

    let page = fx.accounts.list(PageRequest::new(1, 2, 100)).await.unwrap();

    assert_eq!(page.total, 4);
    let codes: Vec<i32> = page.items.iter().map(|a| a.account.code).collect();
    assert_eq!(codes, vec![100, 200]);
    assert!(page.items.iter().all(|a| a.parent.as_ref().map(|p| p.id) == Some(root)));
}

#[tokio::test]
async fn test_tree_depth() {
    let fx = Fixture::new().await;
    let a = fx.account(1, false, None).await;
    let b = fx.account(10, false, Some(a)).await;
    let c = fx.account(100, false, Some(b)).await;
    fx.account(1000, true, Some(c)).await;
    fx.account(2, false, None).await;

    let tree = fx.accounts.tree(2).await.unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].account.code, 1);
    assert_eq!(tree[0].children[0].account.code, 10);
    assert_eq!(tree[0].children[0].children[0].account.code, 100);
    assert!(tree[0].children[0].children[0].children.is_empty());

    let deep = fx.accounts.tree(5).await.unwrap();
    assert_eq!(
        deep[0].children[0].children[0].children[0].account.code,
        1000
    );
}

//! Account repository for chart of accounts database operations.
//!
//! Parent assignment and deletion rules come from `partida_core::chart`;
//! this module loads what those rules need and writes inside a transaction.

use std::collections::HashMap;

use partida_core::chart::{AccountNode, build_tree, ensure_deletable, validate_parent};
use partida_core::ledger::LedgerError;
use partida_shared::types::{AccountId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{finish, optional_text, required_text};
use crate::entities::{accounts, journal_lines};
use crate::error::{RepositoryResult, on_foreign_key, on_unique};

const NAME_MAX: usize = 50;
const CURRENCY_MAX: usize = 20;
const CATEGORY_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 100;

/// Display fields of a parent account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentSummary {
    /// Parent account ID.
    pub id: AccountId,
    /// Parent account name.
    pub name: String,
    /// Parent account code.
    pub code: i32,
}

impl From<&accounts::Model> for ParentSummary {
    fn from(model: &accounts::Model) -> Self {
        Self {
            id: AccountId(model.id),
            name: model.name.clone(),
            code: model.code,
        }
    }
}

/// Account with its parent's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountWithParent {
    /// The account record.
    #[serde(flatten)]
    pub account: accounts::Model,
    /// The parent account, if any.
    pub parent: Option<ParentSummary>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account name.
    pub name: String,
    /// Alternate name.
    pub alt_name: Option<String>,
    /// Account code (globally unique).
    pub code: i32,
    /// Whether journal lines may post to this account.
    pub postable: bool,
    /// Currency label.
    pub currency: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Parent account ID.
    pub parent_id: Option<AccountId>,
}

/// Input for updating an account.
///
/// `None` leaves a field unchanged; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub name: Option<String>,
    /// Alternate name.
    pub alt_name: Option<Option<String>>,
    /// Account code.
    pub code: Option<i32>,
    /// Postable flag.
    pub postable: Option<bool>,
    /// Currency label.
    pub currency: Option<Option<String>>,
    /// Category label.
    pub category: Option<Option<String>>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Parent account ID.
    pub parent_id: Option<Option<AccountId>>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field fails validation
    /// - The code already exists (`DuplicateCode`)
    /// - The parent does not exist (`InvalidParent`)
    pub async fn create(&self, input: CreateAccountInput) -> RepositoryResult<accounts::Model> {
        let txn = self.db.begin().await?;
        let result = Self::insert_account(&txn, input).await;
        let account = finish(txn, result).await?;

        info!(account_id = account.id, code = account.code, "Account created");
        Ok(account)
    }

    async fn insert_account(
        txn: &DatabaseTransaction,
        input: CreateAccountInput,
    ) -> RepositoryResult<accounts::Model> {
        let name = required_text("name", &input.name, NAME_MAX)?;
        let alt_name = optional_text("alt_name", input.alt_name, NAME_MAX)?;
        let currency = optional_text("currency", input.currency, CURRENCY_MAX)?;
        let category = optional_text("category", input.category, CATEGORY_MAX)?;
        let description = optional_text("description", input.description, DESCRIPTION_MAX)?;

        if Self::code_taken(txn, input.code, None).await? {
            warn!(code = input.code, "Rejected duplicate account code");
            return Err(LedgerError::DuplicateCode(input.code).into());
        }

        if let Some(parent_id) = input.parent_id {
            let parent = accounts::Entity::find_by_id(parent_id.0).one(txn).await?;
            validate_parent(None, parent_id, |id| {
                parent
                    .as_ref()
                    .filter(|p| p.id == id.0)
                    .map(|p| p.parent_id.map(AccountId))
            })?;
        }

        let code = input.code;
        let account = accounts::ActiveModel {
            name: Set(name),
            alt_name: Set(alt_name),
            code: Set(code),
            postable: Set(input.postable),
            currency: Set(currency),
            category: Set(category),
            description: Set(description),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            ..Default::default()
        };

        account
            .insert(txn)
            .await
            .map_err(|e| on_unique(e, || LedgerError::DuplicateCode(code)))
    }

    /// Finds an account by ID together with its parent's display fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get(&self, id: AccountId) -> RepositoryResult<AccountWithParent> {
        let account = accounts::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::account_not_found(id))?;

        let parent = match account.parent_id {
            Some(parent_id) => accounts::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .as_ref()
                .map(ParentSummary::from),
            None => None,
        };

        Ok(AccountWithParent { account, parent })
    }

    /// Lists a page of accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: PageRequest) -> RepositoryResult<PageResponse<AccountWithParent>> {
        let total = accounts::Entity::find().count(&self.db).await?;

        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;

        let parent_ids: Vec<i32> = accounts.iter().filter_map(|a| a.parent_id).collect();
        let parents: HashMap<i32, ParentSummary> = if parent_ids.is_empty() {
            HashMap::new()
        } else {
            accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(parent_ids))
                .all(&self.db)
                .await?
                .iter()
                .map(|p| (p.id, ParentSummary::from(p)))
                .collect()
        };

        let items = accounts
            .into_iter()
            .map(|account| {
                let parent = account.parent_id.and_then(|id| parents.get(&id).cloned());
                AccountWithParent { account, parent }
            })
            .collect();

        Ok(PageResponse::new(total, items))
    }

    /// Returns the root accounts with `depth` levels of descendants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn tree(&self, depth: usize) -> RepositoryResult<Vec<AccountNode<accounts::Model>>> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(build_tree(accounts, depth))
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist (`NotFound`)
    /// - The new code belongs to another account (`DuplicateCode`)
    /// - The new parent is the account itself, does not exist, or is one
    ///   of its descendants (`SelfParent`, `InvalidParent`, `Cycle`)
    pub async fn update(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> RepositoryResult<accounts::Model> {
        let txn = self.db.begin().await?;
        let result = Self::update_account(&txn, id, input).await;
        let account = finish(txn, result).await?;

        info!(account_id = account.id, "Account updated");
        Ok(account)
    }

    async fn update_account(
        txn: &DatabaseTransaction,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> RepositoryResult<accounts::Model> {
        let account = accounts::Entity::find_by_id(id.0)
            .one(txn)
            .await?
            .ok_or(LedgerError::account_not_found(id))?;

        if let Some(code) = input.code
            && code != account.code
            && Self::code_taken(txn, code, Some(id)).await?
        {
            warn!(account_id = id.0, code, "Rejected duplicate account code");
            return Err(LedgerError::DuplicateCode(code).into());
        }

        if let Some(Some(parent_id)) = input.parent_id {
            let parents = Self::parent_map(txn).await?;
            validate_parent(Some(id), parent_id, |a| parents.get(&a).copied())?;
        }

        let code = input.code.unwrap_or(account.code);
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(required_text("name", &name, NAME_MAX)?);
        }
        if let Some(alt_name) = input.alt_name {
            active.alt_name = Set(optional_text("alt_name", alt_name, NAME_MAX)?);
        }
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(postable) = input.postable {
            active.postable = Set(postable);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(optional_text("currency", currency, CURRENCY_MAX)?);
        }
        if let Some(category) = input.category {
            active.category = Set(optional_text("category", category, CATEGORY_MAX)?);
        }
        if let Some(description) = input.description {
            active.description = Set(optional_text("description", description, DESCRIPTION_MAX)?);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id.map(AccountId::into_inner));
        }

        active
            .update(txn)
            .await
            .map_err(|e| on_unique(e, || LedgerError::DuplicateCode(code)))
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist (`NotFound`)
    /// - Another account names it as parent (`HasChildren`)
    /// - A journal line references it (`InUse`)
    pub async fn delete(&self, id: AccountId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let result = Self::delete_account(&txn, id).await;
        finish(txn, result).await?;

        info!(account_id = id.0, "Account deleted");
        Ok(())
    }

    async fn delete_account(txn: &DatabaseTransaction, id: AccountId) -> RepositoryResult<()> {
        accounts::Entity::find_by_id(id.0)
            .one(txn)
            .await?
            .ok_or(LedgerError::account_not_found(id))?;

        let child_count = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id.0))
            .count(txn)
            .await?;
        let line_count = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id.0))
            .count(txn)
            .await?;

        if let Err(e) = ensure_deletable(id, child_count, line_count) {
            warn!(account_id = id.0, child_count, line_count, "Rejected account delete");
            return Err(e.into());
        }

        accounts::Entity::delete_by_id(id.0)
            .exec(txn)
            .await
            .map_err(|e| {
                on_foreign_key(e, || LedgerError::InUse {
                    entity: "Account",
                    id: id.0,
                })
            })?;

        Ok(())
    }

    /// Checks whether a code is used by an account other than `exclude`.
    async fn code_taken(
        txn: &DatabaseTransaction,
        code: i32,
        exclude: Option<AccountId>,
    ) -> RepositoryResult<bool> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Code.eq(code));
        if let Some(exclude) = exclude {
            query = query.filter(accounts::Column::Id.ne(exclude.0));
        }
        Ok(query.count(txn).await? > 0)
    }

    /// Loads every account's parent link for ancestor walks.
    async fn parent_map(
        txn: &DatabaseTransaction,
    ) -> RepositoryResult<HashMap<AccountId, Option<AccountId>>> {
        let rows: Vec<(i32, Option<i32>)> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .column(accounts::Column::ParentId)
            .into_tuple()
            .all(txn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, parent)| (AccountId(id), parent.map(AccountId)))
            .collect())
    }
}

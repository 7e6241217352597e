//! Journal repository implementing the posting workflow.
//!
//! Every mutation runs in one database transaction: the header and its lines
//! are written together or not at all. Writes to an existing header are
//! conditional on `status = 'pending'`, so a concurrent finalize cannot be
//! overtaken by an update or delete that read the entry before it was posted.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use partida_core::ledger::validation::AMOUNT_SCALE;
use partida_core::ledger::{
    AccountInfo, EntryStatus, EntryTotals, EntryType, LedgerError, LedgerService, LineInput,
    StatusSummary, summarize,
};
use partida_shared::types::{
    AccountId, BranchId, CompanyId, EntryId, LineId, PageRequest, PageResponse,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{finish, optional_text, required_text};
use crate::entities::{
    accounts, companies, journal_headers, journal_lines,
    sea_orm_active_enums::EntryStatus as DbEntryStatus,
};
use crate::error::{RepositoryError, RepositoryResult, on_unique};

const ENTRY_NUMBER_MAX: usize = 20;
const DOCUMENT_MAX: usize = 50;
const MEMO_MAX: usize = 100;

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Branch of the company.
    pub branch_id: BranchId,
    /// Entry type.
    pub entry_type: EntryType,
    /// Caller-supplied number, unique per company.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Supporting document reference.
    pub document: Option<String>,
    /// Line items.
    pub lines: Vec<LineInput>,
}

/// Input for updating a pending journal entry.
///
/// Header fields left as `None` are unchanged. When `lines` is set and not
/// empty the existing lines are replaced and the totals recomputed.
#[derive(Debug, Clone, Default)]
pub struct UpdateEntryInput {
    /// Owning company.
    pub company_id: Option<CompanyId>,
    /// Branch of the company.
    pub branch_id: Option<BranchId>,
    /// Entry type.
    pub entry_type: Option<EntryType>,
    /// Entry number.
    pub entry_number: Option<String>,
    /// Entry date.
    pub date: Option<NaiveDate>,
    /// Supporting document reference.
    pub document: Option<Option<String>>,
    /// Status as sent by the caller; only the current status is accepted.
    pub status: Option<EntryStatus>,
    /// Replacement line items.
    pub lines: Option<Vec<LineInput>>,
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by company.
    pub company_id: Option<CompanyId>,
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// First date included.
    pub date_from: Option<NaiveDate>,
    /// Last date included.
    pub date_to: Option<NaiveDate>,
}

/// Display fields of the account a line posts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineAccount {
    /// Account name.
    pub name: String,
    /// Account code.
    pub code: i32,
    /// Postable flag.
    pub postable: bool,
}

/// A journal line with its account's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    /// Line ID.
    pub id: LineId,
    /// Account ID.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Memo.
    pub memo: Option<String>,
    /// The account posted to.
    pub account: Option<LineAccount>,
}

/// A journal entry header with its lines and company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDetail {
    /// Entry ID.
    pub id: EntryId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Company name.
    pub company_name: Option<String>,
    /// Branch.
    pub branch_id: BranchId,
    /// Entry type.
    pub entry_type: EntryType,
    /// Entry number.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Supporting document reference.
    pub document: Option<String>,
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
    /// Total debit minus total credit.
    pub difference: Decimal,
    /// Current status.
    pub status: EntryStatus,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
    /// Line items in insertion order.
    pub lines: Vec<LineDetail>,
}

impl EntryDetail {
    /// Returns the entry totals.
    #[must_use]
    pub const fn totals(&self) -> EntryTotals {
        EntryTotals::new(self.total_debit, self.total_credit)
    }
}

/// Journal repository for the posting workflow.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The company does not exist (`NotFound`)
    /// - The entry number is already used by the company (`DuplicateEntryNumber`)
    /// - A line references a missing or summary account (`UnknownAccount`,
    ///   `AccountNotPostable`)
    /// - Debits and credits differ by more than 0.01 (`Unbalanced`)
    pub async fn create(&self, input: CreateEntryInput) -> RepositoryResult<EntryDetail> {
        let company_id = input.company_id;
        let txn = self.db.begin().await?;
        let result = Self::insert_entry(&txn, input).await;
        let id = finish(txn, result)
            .await
            .inspect_err(|e| log_rejection(e, "Rejected journal entry create"))?;

        info!(entry_id = id.0, company_id = company_id.0, "Journal entry created");
        self.get(id).await
    }

    async fn insert_entry(
        txn: &DatabaseTransaction,
        input: CreateEntryInput,
    ) -> RepositoryResult<EntryId> {
        let entry_number = required_text("entry_number", &input.entry_number, ENTRY_NUMBER_MAX)?;
        let document = optional_text("document", input.document, DOCUMENT_MAX)?;

        Self::ensure_company(txn, input.company_id).await?;
        Self::ensure_number_free(txn, input.company_id, &entry_number, None).await?;

        let (lines, totals) = Self::validate_lines(txn, &input.lines).await?;

        let now = Utc::now().into();
        let header = journal_headers::ActiveModel {
            company_id: Set(input.company_id.0),
            branch_id: Set(input.branch_id.0),
            entry_type: Set(input.entry_type.into()),
            entry_number: Set(entry_number.clone()),
            date: Set(input.date),
            document: Set(document),
            total_debit: Set(totals.total_debit),
            total_credit: Set(totals.total_credit),
            status: Set(DbEntryStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let company_id = input.company_id;
        let header = header.insert(txn).await.map_err(|e| {
            on_unique(e, || LedgerError::DuplicateEntryNumber {
                company_id,
                entry_number,
            })
        })?;

        let id = EntryId(header.id);
        Self::insert_lines(txn, id, lines).await?;
        Ok(id)
    }

    /// Finds a journal entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub async fn get(&self, id: EntryId) -> RepositoryResult<EntryDetail> {
        let header = journal_headers::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::entry_not_found(id))?;

        hydrate(&self.db, vec![header])
            .await?
            .pop()
            .ok_or_else(|| LedgerError::entry_not_found(id).into())
    }

    /// Lists a page of journal entries.
    ///
    /// Entries are ordered by date, then entry number, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: EntryFilter,
        page: PageRequest,
    ) -> RepositoryResult<PageResponse<EntryDetail>> {
        let total = filtered(&filter).count(&self.db).await?;

        let headers = filtered(&filter)
            .order_by_desc(journal_headers::Column::Date)
            .order_by_desc(journal_headers::Column::EntryNumber)
            .order_by_desc(journal_headers::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;

        let items = hydrate(&self.db, headers).await?;
        Ok(PageResponse::new(total, items))
    }

    /// Returns every entry matching `filter`, oldest first.
    ///
    /// Used to build report datasets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn export(&self, filter: EntryFilter) -> RepositoryResult<Vec<EntryDetail>> {
        let headers = filtered(&filter)
            .order_by_asc(journal_headers::Column::Date)
            .order_by_asc(journal_headers::Column::EntryNumber)
            .order_by_asc(journal_headers::Column::Id)
            .all(&self.db)
            .await?;

        hydrate(&self.db, headers).await
    }

    /// Updates a pending journal entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The entry does not exist (`NotFound`)
    /// - The entry is posted (`AlreadyPosted`)
    /// - The payload tries to change the status (`ValidationFailed`)
    /// - The new entry number collides (`DuplicateEntryNumber`)
    /// - Replacement lines fail the same checks as on create
    pub async fn update(&self, id: EntryId, input: UpdateEntryInput) -> RepositoryResult<EntryDetail> {
        let txn = self.db.begin().await?;
        let result = Self::update_entry(&txn, id, input).await;
        finish(txn, result)
            .await
            .inspect_err(|e| log_rejection(e, "Rejected journal entry update"))?;

        info!(entry_id = id.0, "Journal entry updated");
        self.get(id).await
    }

    async fn update_entry(
        txn: &DatabaseTransaction,
        id: EntryId,
        input: UpdateEntryInput,
    ) -> RepositoryResult<()> {
        let header = Self::find_header(txn, id).await?;
        let status: EntryStatus = header.status.into();
        LedgerService::validate_can_modify(id, status)?;

        if let Some(requested) = input.status
            && requested != status
        {
            return Err(LedgerError::validation(
                "status",
                format!("cannot change status to {requested}; use finalize to post an entry"),
            )
            .into());
        }

        let company_id = input.company_id.unwrap_or(CompanyId(header.company_id));
        let entry_number = match &input.entry_number {
            Some(number) => required_text("entry_number", number, ENTRY_NUMBER_MAX)?,
            None => header.entry_number.clone(),
        };

        if let Some(company) = input.company_id
            && company.0 != header.company_id
        {
            Self::ensure_company(txn, company).await?;
        }
        if company_id.0 != header.company_id || entry_number != header.entry_number {
            Self::ensure_number_free(txn, company_id, &entry_number, Some(id)).await?;
        }

        // an empty line set counts as omitted
        let replacement = match input.lines.filter(|lines| !lines.is_empty()) {
            Some(lines) => Some(Self::validate_lines(txn, &lines).await?),
            None => None,
        };

        let mut active = journal_headers::ActiveModel {
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if input.company_id.is_some() {
            active.company_id = Set(company_id.0);
        }
        if let Some(branch_id) = input.branch_id {
            active.branch_id = Set(branch_id.0);
        }
        if let Some(entry_type) = input.entry_type {
            active.entry_type = Set(entry_type.into());
        }
        if input.entry_number.is_some() {
            active.entry_number = Set(entry_number.clone());
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(document) = input.document {
            active.document = Set(optional_text("document", document, DOCUMENT_MAX)?);
        }
        if let Some((_, totals)) = &replacement {
            active.total_debit = Set(totals.total_debit);
            active.total_credit = Set(totals.total_credit);
        }

        let written = journal_headers::Entity::update_many()
            .set(active)
            .filter(journal_headers::Column::Id.eq(id.0))
            .filter(journal_headers::Column::Status.eq(DbEntryStatus::Pending))
            .exec(txn)
            .await
            .map_err(|e| {
                on_unique(e, || LedgerError::DuplicateEntryNumber {
                    company_id,
                    entry_number,
                })
            })?;
        if written.rows_affected == 0 {
            return Err(LedgerError::AlreadyPosted(id).into());
        }

        if let Some((lines, _)) = replacement {
            journal_lines::Entity::delete_many()
                .filter(journal_lines::Column::HeaderId.eq(id.0))
                .exec(txn)
                .await?;
            Self::insert_lines(txn, id, lines).await?;
        }

        Ok(())
    }

    /// Deletes a pending journal entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AlreadyPosted`.
    pub async fn delete(&self, id: EntryId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let result = Self::delete_entry(&txn, id).await;
        finish(txn, result)
            .await
            .inspect_err(|e| log_rejection(e, "Rejected journal entry delete"))?;

        info!(entry_id = id.0, "Journal entry deleted");
        Ok(())
    }

    async fn delete_entry(txn: &DatabaseTransaction, id: EntryId) -> RepositoryResult<()> {
        let header = Self::find_header(txn, id).await?;
        LedgerService::validate_can_delete(id, header.status.into())?;

        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::HeaderId.eq(id.0))
            .exec(txn)
            .await?;

        let deleted = journal_headers::Entity::delete_many()
            .filter(journal_headers::Column::Id.eq(id.0))
            .filter(journal_headers::Column::Status.eq(DbEntryStatus::Pending))
            .exec(txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(LedgerError::AlreadyPosted(id).into());
        }

        Ok(())
    }

    /// Posts a pending journal entry.
    ///
    /// The balance is recomputed from the stored lines at the time of the
    /// call.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyPosted` or `Unbalanced`.
    pub async fn finalize(&self, id: EntryId) -> RepositoryResult<EntryDetail> {
        let txn = self.db.begin().await?;
        let result = Self::finalize_entry(&txn, id).await;
        finish(txn, result)
            .await
            .inspect_err(|e| log_rejection(e, "Rejected journal entry finalize"))?;

        info!(entry_id = id.0, "Journal entry posted");
        self.get(id).await
    }

    async fn finalize_entry(txn: &DatabaseTransaction, id: EntryId) -> RepositoryResult<()> {
        let header = Self::find_header(txn, id).await?;

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::HeaderId.eq(id.0))
            .all(txn)
            .await?;
        let totals = EntryTotals::from_amounts(lines.iter().map(|l| (l.debit, l.credit)))
            .ok_or_else(|| {
                LedgerError::validation("lines", "line amounts overflow the entry totals")
            })?;

        let next = LedgerService::finalize(id, header.status.into(), &totals)?;

        let active = journal_headers::ActiveModel {
            status: Set(next.into()),
            total_debit: Set(totals.total_debit),
            total_credit: Set(totals.total_credit),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let written = journal_headers::Entity::update_many()
            .set(active)
            .filter(journal_headers::Column::Id.eq(id.0))
            .filter(journal_headers::Column::Status.eq(DbEntryStatus::Pending))
            .exec(txn)
            .await?;
        if written.rows_affected == 0 {
            return Err(LedgerError::AlreadyPosted(id).into());
        }

        Ok(())
    }

    /// Returns per-status counts and totals for a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the company does not exist.
    pub async fn summary(&self, company_id: CompanyId) -> RepositoryResult<Vec<StatusSummary>> {
        Self::ensure_company(&self.db, company_id).await?;

        let headers = journal_headers::Entity::find()
            .filter(journal_headers::Column::CompanyId.eq(company_id.0))
            .all(&self.db)
            .await?;

        Ok(summarize(headers.into_iter().map(|h| {
            (
                h.status.into(),
                EntryTotals::new(h.total_debit, h.total_credit),
            )
        }))
        .into_iter()
        .map(|mut s| {
            s.total_debit = money(s.total_debit);
            s.total_credit = money(s.total_credit);
            s
        })
        .collect())
    }

    async fn find_header(
        txn: &DatabaseTransaction,
        id: EntryId,
    ) -> RepositoryResult<journal_headers::Model> {
        let header = journal_headers::Entity::find_by_id(id.0)
            .one(txn)
            .await?
            .ok_or(LedgerError::entry_not_found(id))?;
        Ok(header)
    }

    async fn ensure_company<C: ConnectionTrait>(db: &C, id: CompanyId) -> RepositoryResult<()> {
        let found = companies::Entity::find_by_id(id.0).count(db).await?;
        if found == 0 {
            return Err(LedgerError::company_not_found(id).into());
        }
        Ok(())
    }

    /// Pre-checks entry number uniqueness; the unique index has the last word.
    async fn ensure_number_free(
        txn: &DatabaseTransaction,
        company_id: CompanyId,
        entry_number: &str,
        exclude: Option<EntryId>,
    ) -> RepositoryResult<()> {
        let mut query = journal_headers::Entity::find()
            .filter(journal_headers::Column::CompanyId.eq(company_id.0))
            .filter(journal_headers::Column::EntryNumber.eq(entry_number));
        if let Some(exclude) = exclude {
            query = query.filter(journal_headers::Column::Id.ne(exclude.0));
        }

        if query.count(txn).await? > 0 {
            return Err(LedgerError::DuplicateEntryNumber {
                company_id,
                entry_number: entry_number.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolves line accounts and applies the posting rules.
    async fn validate_lines(
        txn: &DatabaseTransaction,
        lines: &[LineInput],
    ) -> RepositoryResult<(Vec<LineInput>, EntryTotals)> {
        for line in lines {
            if let Some(memo) = &line.memo {
                optional_text("memo", Some(memo.clone()), MEMO_MAX)?;
            }
        }

        let ids: HashSet<i32> = lines.iter().map(|l| l.account_id.0).collect();
        let accounts: HashMap<AccountId, AccountInfo> = if ids.is_empty() {
            HashMap::new()
        } else {
            accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(ids))
                .all(txn)
                .await?
                .into_iter()
                .map(|a| {
                    let id = AccountId(a.id);
                    (
                        id,
                        AccountInfo {
                            id,
                            code: a.code,
                            postable: a.postable,
                        },
                    )
                })
                .collect()
        };

        Ok(LedgerService::validate_lines(lines, |id| {
            accounts.get(&id).copied()
        })?)
    }

    async fn insert_lines(
        txn: &DatabaseTransaction,
        header_id: EntryId,
        lines: Vec<LineInput>,
    ) -> RepositoryResult<()> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let models = lines.into_iter().map(|line| journal_lines::ActiveModel {
            header_id: Set(header_id.0),
            account_id: Set(line.account_id.0),
            debit: Set(line.debit),
            credit: Set(line.credit),
            memo: Set(line.memo),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });

        journal_lines::Entity::insert_many(models).exec(txn).await?;
        Ok(())
    }
}

fn filtered(filter: &EntryFilter) -> Select<journal_headers::Entity> {
    let mut query = journal_headers::Entity::find();

    if let Some(company_id) = filter.company_id {
        query = query.filter(journal_headers::Column::CompanyId.eq(company_id.0));
    }
    if let Some(status) = filter.status {
        query = query.filter(journal_headers::Column::Status.eq(DbEntryStatus::from(status)));
    }
    if let Some(date_from) = filter.date_from {
        query = query.filter(journal_headers::Column::Date.gte(date_from));
    }
    if let Some(date_to) = filter.date_to {
        query = query.filter(journal_headers::Column::Date.lte(date_to));
    }

    query
}

/// Joins lines, line accounts and company names onto headers.
///
/// Issues one query per table regardless of the number of headers.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    headers: Vec<journal_headers::Model>,
) -> RepositoryResult<Vec<EntryDetail>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let header_ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
    let company_ids: HashSet<i32> = headers.iter().map(|h| h.company_id).collect();

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::HeaderId.is_in(header_ids))
        .order_by_asc(journal_lines::Column::Id)
        .all(db)
        .await?;

    let account_ids: HashSet<i32> = lines.iter().map(|l| l.account_id).collect();
    let accounts: HashMap<i32, LineAccount> = if account_ids.is_empty() {
        HashMap::new()
    } else {
        accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| {
                (
                    a.id,
                    LineAccount {
                        name: a.name,
                        code: a.code,
                        postable: a.postable,
                    },
                )
            })
            .collect()
    };

    let company_names: HashMap<i32, String> = companies::Entity::find()
        .filter(companies::Column::Id.is_in(company_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut lines_by_header: HashMap<i32, Vec<LineDetail>> = HashMap::new();
    for line in lines {
        lines_by_header
            .entry(line.header_id)
            .or_default()
            .push(LineDetail {
                id: LineId(line.id),
                account_id: AccountId(line.account_id),
                debit: money(line.debit),
                credit: money(line.credit),
                memo: line.memo,
                account: accounts.get(&line.account_id).cloned(),
            });
    }

    Ok(headers
        .into_iter()
        .map(|h| {
            let totals = EntryTotals::new(money(h.total_debit), money(h.total_credit));
            EntryDetail {
                id: EntryId(h.id),
                company_id: CompanyId(h.company_id),
                company_name: company_names.get(&h.company_id).cloned(),
                branch_id: BranchId(h.branch_id),
                entry_type: h.entry_type.into(),
                entry_number: h.entry_number,
                date: h.date,
                document: h.document,
                total_debit: totals.total_debit,
                total_credit: totals.total_credit,
                difference: money(totals.difference()),
                status: h.status.into(),
                created_at: h.created_at,
                updated_at: h.updated_at,
                lines: lines_by_header.remove(&h.id).unwrap_or_default(),
            }
        })
        .collect())
}

/// Presents a stored amount with exactly two decimal places.
fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(AMOUNT_SCALE);
    amount
}

fn log_rejection(err: &RepositoryError, message: &str) {
    match err {
        RepositoryError::Ledger(e) => warn!(code = e.error_code(), error = %e, "{message}"),
        RepositoryError::Database(e) => tracing::error!(error = %e, "{message}"),
    }
}

//! Journal entry routes: CRUD, posting and per-status summary.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use partida_core::ledger::{
    LedgerError, LineInput, parse_entry_date, parse_entry_type, parse_status,
};
use partida_db::repositories::{CreateEntryInput, EntryFilter, JournalRepository, UpdateEntryInput};
use partida_shared::types::{AccountId, BranchId, CompanyId, EntryId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::{date_param, double_option, id_param, page_request, param};
use crate::AppState;
use crate::error::ApiResult;

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/{entry_id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/entries/{entry_id}/finalize", patch(finalize_entry))
        .route("/entries/summary/{company_id}", get(entry_summary))
}

/// Query parameters for listing entries. All values are parsed leniently:
/// blank means absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    /// Rows to skip.
    pub offset: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Company filter.
    pub company: Option<String>,
    /// Status filter (`pending` or `posted`).
    pub status: Option<String>,
    /// Earliest entry date, inclusive.
    pub date_from: Option<String>,
    /// Latest entry date, inclusive.
    pub date_to: Option<String>,
}

impl ListEntriesQuery {
    fn filter(&self) -> Result<EntryFilter, LedgerError> {
        Ok(EntryFilter {
            company_id: id_param("company", self.company.as_ref())?,
            status: param(self.status.as_ref()).map(parse_status).transpose()?,
            date_from: date_param("date_from", self.date_from.as_ref())?,
            date_to: date_param("date_to", self.date_to.as_ref())?,
        })
    }
}

/// A journal line in a request body. Missing amounts count as zero.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Option<Decimal>,
    /// Credit amount.
    pub credit: Option<Decimal>,
    /// Line memo.
    pub memo: Option<String>,
}

impl From<LineRequest> for LineInput {
    fn from(line: LineRequest) -> Self {
        Self {
            account_id: line.account_id,
            debit: line.debit.unwrap_or_default(),
            credit: line.credit.unwrap_or_default(),
            memo: line.memo,
        }
    }
}

/// Request body for creating an entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Owning company.
    pub company_id: CompanyId,
    /// Branch.
    pub branch_id: BranchId,
    /// `Manual`, `Purchase`, `Sale` or `Adjustment`.
    pub entry_type: String,
    /// Entry number, unique per company.
    pub entry_number: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Supporting document reference.
    pub document: Option<String>,
    /// Line items.
    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

/// Request body for updating a pending entry.
///
/// Omitted fields keep their value. Sending `lines` replaces every line;
/// an empty array is treated as omitted.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    /// Owning company.
    pub company_id: Option<CompanyId>,
    /// Branch.
    pub branch_id: Option<BranchId>,
    /// Entry type.
    pub entry_type: Option<String>,
    /// Entry number.
    pub entry_number: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Supporting document reference, `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    pub document: Option<Option<String>>,
    /// Must match the current status when present.
    pub status: Option<String>,
    /// Replacement lines.
    pub lines: Option<Vec<LineRequest>>,
}

impl TryFrom<CreateEntryRequest> for CreateEntryInput {
    type Error = LedgerError;

    fn try_from(req: CreateEntryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: req.company_id,
            branch_id: req.branch_id,
            entry_type: parse_entry_type(&req.entry_type)?,
            entry_number: req.entry_number,
            date: parse_entry_date(&req.date)?,
            document: req.document,
            lines: req.lines.into_iter().map(LineInput::from).collect(),
        })
    }
}

impl TryFrom<UpdateEntryRequest> for UpdateEntryInput {
    type Error = LedgerError;

    fn try_from(req: UpdateEntryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: req.company_id,
            branch_id: req.branch_id,
            entry_type: req.entry_type.as_deref().map(parse_entry_type).transpose()?,
            entry_number: req.entry_number,
            date: req.date.as_deref().map(parse_entry_date).transpose()?,
            document: req.document,
            status: req.status.as_deref().map(parse_status).transpose()?,
            lines: req
                .lines
                .map(|lines| lines.into_iter().map(LineInput::from).collect()),
        })
    }
}

/// GET `/entries` - Page of hydrated entries, newest first.
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.filter()?;
    let page = page_request(&state, query.offset.as_deref(), query.limit.as_deref());

    let repo = JournalRepository::new((*state.db).clone());
    let page = repo.list(filter, page).await?;

    Ok(Json(json!({
        "total": page.total,
        "entries": page.items
    })))
}

/// GET `/entries/{entry_id}`
async fn get_entry(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = JournalRepository::new((*state.db).clone());

    Ok(Json(repo.get(EntryId(id)).await?))
}

/// POST `/entries` - Create a pending entry with its lines.
async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input = CreateEntryInput::try_from(payload)?;

    let repo = JournalRepository::new((*state.db).clone());
    let entry = repo.create(input).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT `/entries/{entry_id}` - Update a pending entry.
async fn update_entry(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let input = UpdateEntryInput::try_from(payload)?;

    let repo = JournalRepository::new((*state.db).clone());

    Ok(Json(repo.update(EntryId(id), input).await?))
}

/// DELETE `/entries/{entry_id}` - Delete a pending entry and its lines.
async fn delete_entry(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = JournalRepository::new((*state.db).clone());
    repo.delete(EntryId(id)).await?;

    Ok(Json(json!({ "msg": format!("Journal entry {id} deleted") })))
}

/// PATCH `/entries/{entry_id}/finalize` - Post a balanced pending entry.
async fn finalize_entry(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = JournalRepository::new((*state.db).clone());
    let entry = repo.finalize(EntryId(id)).await?;

    Ok(Json(json!({
        "msg": format!("Journal entry {id} posted"),
        "entry": entry
    })))
}

/// GET `/entries/summary/{company_id}` - Count and totals per status.
async fn entry_summary(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(company_id) = path?;
    let repo = JournalRepository::new((*state.db).clone());

    Ok(Json(repo.summary(CompanyId(company_id)).await?))
}

//! Report routes backed by the external renderer.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use partida_core::reports::{ReportRequest, ReportSource};
use partida_db::repositories::{EntryDetail, EntryFilter, JournalRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{date_param, id_param};
use crate::AppState;
use crate::error::ApiResult;

/// Template used for the journal entry listing.
pub const ENTRIES_TEMPLATE: &str = "journal_entries";

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_templates))
        .route("/reports/entries", get(entries_report))
}

/// Query parameters for the journal entry report.
#[derive(Debug, Default, Deserialize)]
pub struct EntriesReportQuery {
    /// Restrict to one company.
    pub company_id: Option<String>,
    /// Earliest entry date, inclusive.
    pub date_from: Option<String>,
    /// Latest entry date, inclusive.
    pub date_to: Option<String>,
}

/// One row of the inline dataset: a journal line with its header fields.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    entry_id: i32,
    company: Option<&'a str>,
    entry_type: &'static str,
    entry_number: &'a str,
    date: String,
    document: Option<&'a str>,
    status: &'static str,
    account_code: Option<i32>,
    account_name: Option<&'a str>,
    memo: Option<&'a str>,
    debit: String,
    credit: String,
}

fn report_rows(entries: &[EntryDetail]) -> Vec<ReportRow<'_>> {
    entries
        .iter()
        .flat_map(|entry| {
            entry.lines.iter().map(move |line| ReportRow {
                entry_id: entry.id.0,
                company: entry.company_name.as_deref(),
                entry_type: entry.entry_type.as_str(),
                entry_number: &entry.entry_number,
                date: entry.date.to_string(),
                document: entry.document.as_deref(),
                status: entry.status.as_str(),
                account_code: line.account.as_ref().map(|a| a.code),
                account_name: line.account.as_ref().map(|a| a.name.as_str()),
                memo: line.memo.as_deref(),
                debit: line.debit.to_string(),
                credit: line.credit.to_string(),
            })
        })
        .collect()
}

/// GET `/reports` - Templates available to the renderer.
async fn list_templates(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let templates = state.renderer.templates().await?;
    Ok(Json(json!({ "templates": templates })))
}

/// GET `/reports/entries` - Journal entry listing as PDF.
///
/// Uses the live store connection when one is configured, otherwise renders
/// from an inline dataset built from the matching entries.
async fn entries_report(
    State(state): State<AppState>,
    Query(query): Query<EntriesReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = EntryFilter {
        company_id: id_param("company_id", query.company_id.as_ref())?,
        date_from: date_param("date_from", query.date_from.as_ref())?,
        date_to: date_param("date_to", query.date_to.as_ref())?,
        status: None,
    };

    let source = match &state.report_store {
        Some(store) => ReportSource::Store(store.clone()),
        None => {
            let repo = JournalRepository::new((*state.db).clone());
            let entries = repo.export(filter.clone()).await?;
            ReportSource::Inline(json!({ "rows": report_rows(&entries) }))
        }
    };

    let mut request = ReportRequest::new(ENTRIES_TEMPLATE, source);
    if let Some(company_id) = filter.company_id {
        request = request.with_parameter("COMPANY_ID", company_id.to_string());
    }
    if let Some(from) = filter.date_from {
        request = request.with_parameter("DATE_FROM", from.to_string());
    }
    if let Some(to) = filter.date_to {
        request = request.with_parameter("DATE_TO", to.to_string());
    }

    let report = state.renderer.render(request).await?;
    let content_type = report.content_type();
    let bytes = report.take_bytes().await?;

    info!(template = ENTRIES_TEMPLATE, size = bytes.len(), "Report rendered");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"journal_entries.pdf\"",
            ),
        ],
        bytes,
    ))
}

//! API route definitions.

use std::str::FromStr;

use axum::Router;
use chrono::NaiveDate;
use partida_core::ledger::{LedgerError, parse_entry_date};
use partida_shared::types::PageRequest;
use serde::{Deserialize, Deserializer};

use crate::AppState;

pub mod accounts;
pub mod companies;
pub mod entries;
pub mod health;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(companies::routes())
        .merge(entries::routes())
        .merge(reports::routes())
}

/// Raw `offset`/`limit` query parameters.
///
/// Kept as text so malformed values fall back to the default page instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Rows to skip.
    pub offset: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

impl PageQuery {
    /// Resolves the page window against the configured limits.
    #[must_use]
    pub fn page(&self, state: &AppState) -> PageRequest {
        page_request(state, self.offset.as_deref(), self.limit.as_deref())
    }
}

pub(crate) fn page_request(
    state: &AppState,
    offset: Option<&str>,
    limit: Option<&str>,
) -> PageRequest {
    PageRequest::from_raw(
        offset,
        limit,
        state.pagination.default_limit,
        state.pagination.max_limit,
    )
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treats a blank query parameter as absent.
pub(crate) fn param(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Parses an optional integer id query parameter.
pub(crate) fn id_param<T: FromStr>(
    field: &'static str,
    value: Option<&String>,
) -> Result<Option<T>, LedgerError> {
    param(value)
        .map(|v| {
            v.parse()
                .map_err(|_| LedgerError::validation(field, format!("'{v}' is not a valid id")))
        })
        .transpose()
}

/// Parses an optional `YYYY-MM-DD` query parameter.
pub(crate) fn date_param(
    field: &'static str,
    value: Option<&String>,
) -> Result<Option<NaiveDate>, LedgerError> {
    param(value)
        .map(|v| {
            parse_entry_date(v).map_err(|_| {
                LedgerError::validation(field, format!("'{v}' is not a valid YYYY-MM-DD date"))
            })
        })
        .transpose()
}

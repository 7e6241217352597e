//! Company routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use partida_db::repositories::{CompanyRepository, CreateCompanyInput, UpdateCompanyInput};
use partida_shared::types::{CompanyId, PeriodId};
use serde::Deserialize;
use serde_json::json;

use super::{PageQuery, double_option};
use crate::AppState;
use crate::error::ApiResult;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{company_id}",
            get(get_company).put(update_company).delete(delete_company),
        )
}

/// Request body for creating a company.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    /// Legal name.
    pub name: String,
    /// Unique tax identifier.
    pub tax_id: String,
    /// Postal address.
    pub address: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Current fiscal period.
    pub period_id: PeriodId,
    /// Defaults to `true`.
    pub active: Option<bool>,
}

/// Request body for updating a company.
#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    /// Legal name.
    pub name: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
    /// Postal address.
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    /// Phone number.
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    /// Current fiscal period.
    pub period_id: Option<PeriodId>,
    /// Active flag.
    pub active: Option<bool>,
}

/// GET `/companies` - List companies ordered by name.
async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new((*state.db).clone());
    let page = repo.list(query.page(&state)).await?;

    Ok(Json(json!({
        "total": page.total,
        "companies": page.items
    })))
}

/// GET `/companies/{company_id}`
async fn get_company(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = CompanyRepository::new((*state.db).clone());

    Ok(Json(repo.get(CompanyId(id)).await?))
}

/// POST `/companies`
async fn create_company(
    State(state): State<AppState>,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .create(CreateCompanyInput {
            name: payload.name,
            tax_id: payload.tax_id,
            address: payload.address,
            phone: payload.phone,
            period_id: payload.period_id,
            active: payload.active.unwrap_or(true),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

/// PUT `/companies/{company_id}`
async fn update_company(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .update(
            CompanyId(id),
            UpdateCompanyInput {
                name: payload.name,
                tax_id: payload.tax_id,
                address: payload.address,
                phone: payload.phone,
                period_id: payload.period_id,
                active: payload.active,
            },
        )
        .await?;

    Ok(Json(company))
}

/// DELETE `/companies/{company_id}` - Blocked while journal entries reference it.
async fn delete_company(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = CompanyRepository::new((*state.db).clone());
    repo.delete(CompanyId(id)).await?;

    Ok(Json(json!({ "msg": format!("Company {id} deleted") })))
}

//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use partida_core::chart::clamp_depth;
use partida_core::ledger::{LedgerError, parse_postable};
use partida_db::repositories::{AccountRepository, CreateAccountInput, UpdateAccountInput};
use partida_shared::types::AccountId;
use serde::Deserialize;
use serde_json::json;

use super::{PageQuery, double_option};
use crate::AppState;
use crate::error::ApiResult;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/tree", get(account_tree))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// Postable flag, sent either as a JSON boolean or as `"Si"`/`"No"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostableFlag {
    /// `true` / `false`.
    Bool(bool),
    /// `"Si"` / `"No"` (also `"true"` / `"false"`).
    Text(String),
}

impl PostableFlag {
    fn resolve(&self) -> Result<bool, LedgerError> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Text(s) => parse_postable(s),
        }
    }
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name.
    pub name: String,
    /// Alternate name.
    pub alt_name: Option<String>,
    /// Unique account code.
    pub code: i32,
    /// Whether lines may post to the account.
    pub postable: PostableFlag,
    /// Currency label.
    pub currency: Option<String>,
    /// Free-form category.
    pub category: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Parent account.
    pub parent_id: Option<AccountId>,
}

/// Request body for updating an account. Absent fields are left as they are;
/// `null` clears a nullable field.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Display name.
    pub name: Option<String>,
    /// Alternate name.
    #[serde(default, deserialize_with = "double_option")]
    pub alt_name: Option<Option<String>>,
    /// Account code.
    pub code: Option<i32>,
    /// Postable flag.
    pub postable: Option<PostableFlag>,
    /// Currency label.
    #[serde(default, deserialize_with = "double_option")]
    pub currency: Option<Option<String>>,
    /// Category.
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    /// Description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Parent account, or `null` to make it a root.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<AccountId>>,
}

/// Query parameters for the account tree.
#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    /// Levels below the roots to include.
    pub depth: Option<String>,
}

/// GET `/accounts` - List accounts ordered by code.
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = AccountRepository::new((*state.db).clone());
    let page = repo.list(query.page(&state)).await?;

    Ok(Json(json!({
        "total": page.total,
        "accounts": page.items
    })))
}

/// GET `/accounts/tree` - Account hierarchy down to `depth`.
async fn account_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<impl IntoResponse> {
    let depth = clamp_depth(query.depth.and_then(|d| d.trim().parse().ok()));
    let repo = AccountRepository::new((*state.db).clone());
    let tree = repo.tree(depth).await?;

    Ok(Json(tree))
}

/// GET `/accounts/{account_id}` - Account with its parent's display fields.
async fn get_account(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = AccountRepository::new((*state.db).clone());
    let account = repo.get(AccountId(id)).await?;

    Ok(Json(account))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input = CreateAccountInput {
        postable: payload.postable.resolve()?,
        name: payload.name,
        alt_name: payload.alt_name,
        code: payload.code,
        currency: payload.currency,
        category: payload.category,
        description: payload.description,
        parent_id: payload.parent_id,
    };

    let repo = AccountRepository::new((*state.db).clone());
    let account = repo.create(input).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// PUT `/accounts/{account_id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let input = UpdateAccountInput {
        postable: payload.postable.as_ref().map(PostableFlag::resolve).transpose()?,
        name: payload.name,
        alt_name: payload.alt_name,
        code: payload.code,
        currency: payload.currency,
        category: payload.category,
        description: payload.description,
        parent_id: payload.parent_id,
    };

    let repo = AccountRepository::new((*state.db).clone());
    let account = repo.update(AccountId(id), input).await?;

    Ok(Json(account))
}

/// DELETE `/accounts/{account_id}` - Delete an account without children or lines.
async fn delete_account(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let repo = AccountRepository::new((*state.db).clone());
    repo.delete(AccountId(id)).await?;

    Ok(Json(json!({ "msg": format!("Account {id} deleted") })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, send, test_state};
    use axum::http::Method;
    use serde_json::Value;

    async fn app() -> Router {
        routes().with_state(test_state().await)
    }

    async fn create(app: &Router, body: Value) -> (StatusCode, Value) {
        send(app.clone(), Method::POST, "/accounts", Some(body)).await
    }

    #[tokio::test]
    async fn test_create_accepts_si_no_flag() {
        let app = app().await;

        let (status, root) = create(
            &app,
            json!({ "name": "Assets", "code": 1, "postable": "No" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(root["postable"], false);

        let (status, cash) = create(
            &app,
            json!({ "name": "Cash", "code": 100, "postable": true, "parent_id": root["id"] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, found) = get(app.clone(), &format!("/accounts/{}", cash["id"])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["name"], "Cash");
        assert_eq!(found["parent"]["code"], 1);
        assert_eq!(found["parent"]["name"], "Assets");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let app = app().await;

        let (status, body) = create(
            &app,
            json!({ "name": "Cash", "code": 100, "postable": "maybe" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_FAILED");

        let (status, body) = create(&app, json!({ "name": "Cash" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        create(&app, json!({ "name": "Cash", "code": 100, "postable": true })).await;
        let (status, body) = create(
            &app,
            json!({ "name": "Bank", "code": 100, "postable": true }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "DUPLICATE_CODE");
        assert_eq!(body["message"], "Account code 100 already exists");
    }

    #[tokio::test]
    async fn test_list_and_tree() {
        let app = app().await;
        let (_, root) =
            create(&app, json!({ "name": "Assets", "code": 1, "postable": false })).await;
        for code in [110, 100] {
            create(
                &app,
                json!({
                    "name": format!("A{code}"),
                    "code": code,
                    "postable": true,
                    "parent_id": root["id"]
                }),
            )
            .await;
        }

        let (status, body) = get(app.clone(), "/accounts?offset=1&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["accounts"].as_array().unwrap().len(), 1);
        assert_eq!(body["accounts"][0]["code"], 100);

        let (status, tree) = get(app.clone(), "/accounts/tree?depth=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tree[0]["code"], 1);
        let children = tree[0]["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["code"], 100);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let app = app().await;
        let (_, root) =
            create(&app, json!({ "name": "Assets", "code": 1, "postable": false })).await;
        let (_, cash) = create(
            &app,
            json!({
                "name": "Cash",
                "code": 100,
                "postable": true,
                "currency": "USD",
                "parent_id": root["id"]
            }),
        )
        .await;
        let cash_uri = format!("/accounts/{}", cash["id"]);
        let root_uri = format!("/accounts/{}", root["id"]);

        let (status, updated) = send(
            app.clone(),
            Method::PUT,
            &cash_uri,
            Some(json!({ "name": "Petty cash", "currency": null, "postable": "Si" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Petty cash");
        assert_eq!(updated["currency"], Value::Null);
        assert_eq!(updated["parent_id"], root["id"]);

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            &root_uri,
            Some(json!({ "parent_id": cash["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "PARENT_CYCLE");

        let (status, body) = send(app.clone(), Method::DELETE, &root_uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "HAS_CHILDREN");

        let (status, body) = send(app.clone(), Method::DELETE, &cash_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["msg"].as_str().unwrap().contains("deleted"));

        let (status, body) = get(app.clone(), &cash_uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_path_id() {
        let (status, body) = get(app().await, "/accounts/abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}

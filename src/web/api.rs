//! JSON API for category and transaction writes.
//!
//! Every handler runs behind the session gate, so an [`Identity`] is always present;
//! the owner id comes from it and never from the request body.

use super::{
    AppState,
    error::{ApiError, JsonBody, QueryParams, ResultExt},
};
use crate::{
    auth::Identity,
    core::{
        category,
        forms::{CategoryForm, TransactionForm, TransactionQuery},
        transaction::{self, TransactionWithCategory},
    },
    entities::{CategoryModel, TransactionModel},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Body of a delete request, and of its response.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct IdBody {
    /// Record id
    pub id: i64,
}

/// Body of `PUT /api/categories`.
#[derive(Debug, Deserialize)]
pub struct UpdateCategory {
    /// Category to update
    pub id: i64,
    /// New field values
    #[serde(flatten)]
    pub form: CategoryForm,
}

/// Body of `PUT /api/transactions`.
#[derive(Debug, Deserialize)]
pub struct UpdateTransaction {
    /// Transaction to update
    pub id: i64,
    /// New field values
    #[serde(flatten)]
    pub form: TransactionForm,
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<CategoryModel>>, ApiError> {
    let categories = category::list(&state.db, &identity.id)
        .await
        .context("Error loading categories")?;
    Ok(Json(categories))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(form): JsonBody<CategoryForm>,
) -> Result<(StatusCode, Json<CategoryModel>), ApiError> {
    let fields = form.validate()?;
    let created = category::create(&state.db, &identity.id, fields)
        .await
        .context("Error saving category")?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/categories`
pub async fn update_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(body): JsonBody<UpdateCategory>,
) -> Result<Json<CategoryModel>, ApiError> {
    let fields = body.form.validate()?;
    let updated = category::update(&state.db, body.id, &identity.id, fields)
        .await
        .context("Error saving category")?;
    Ok(Json(updated))
}

/// `DELETE /api/categories` - also removes the category's transactions.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(body): JsonBody<IdBody>,
) -> Result<Json<IdBody>, ApiError> {
    category::delete(&state.db, body.id, &identity.id)
        .await
        .context("Error deleting category")?;
    Ok(Json(body))
}

/// `GET /api/transactions?type=&category=&start_date=&end_date=`
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<TransactionWithCategory>>, ApiError> {
    let filter = query.validate()?;
    let rows = transaction::list(&state.db, &identity.id, &filter)
        .await
        .context("Error loading transactions")?;
    Ok(Json(rows))
}

/// `POST /api/transactions`
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<(StatusCode, Json<TransactionModel>), ApiError> {
    let fields = form.validate()?;
    let created = transaction::create(&state.db, &identity.id, fields)
        .await
        .context("Error saving transaction")?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/transactions`
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(body): JsonBody<UpdateTransaction>,
) -> Result<Json<TransactionModel>, ApiError> {
    let fields = body.form.validate()?;
    let updated = transaction::update(&state.db, body.id, &identity.id, fields)
        .await
        .context("Error saving transaction")?;
    Ok(Json(updated))
}

/// `DELETE /api/transactions`
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(body): JsonBody<IdBody>,
) -> Result<Json<IdBody>, ApiError> {
    transaction::delete(&state.db, body.id, &identity.id)
        .await
        .context("Error deleting transaction")?;
    Ok(Json(body))
}

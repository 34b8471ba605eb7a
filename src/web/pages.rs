//! Page routes. Each returns the JSON view model its page renders.

use super::{
    AppState,
    error::{ApiError, QueryParams},
    gate::{self, DASHBOARD_PATH, SIGN_IN_PATH},
};
use crate::{
    auth::Identity,
    core::{
        budget::{self, BudgetSummary},
        category,
        dashboard::{self, DashboardSummary},
        or_empty,
        forms::TransactionQuery,
        period::Month,
        transaction::{self, TransactionWithCategory},
    },
    entities::CategoryModel,
};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// `GET /` - sends the caller to the page that fits their session.
pub async fn index(identity: Option<Extension<Identity>>) -> Redirect {
    if identity.is_some() {
        Redirect::temporary(DASHBOARD_PATH)
    } else {
        Redirect::temporary(SIGN_IN_PATH)
    }
}

/// `GET /dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<DashboardSummary> {
    Json(dashboard::summarize(&state.db, &identity.id).await)
}

/// Transactions page view model.
#[derive(Debug, Serialize)]
pub struct TransactionsPage {
    /// Rows matching the filter, newest first
    pub transactions: Vec<TransactionWithCategory>,
    /// Filter options, one per distinct category name
    pub categories: Vec<CategoryModel>,
}

/// `GET /transactions?type=&category=&start_date=&end_date=`
///
/// A malformed filter is a 400; a failed read shows that list empty.
pub async fn transactions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<TransactionsPage>, ApiError> {
    let filter = query.validate()?;

    let (rows, categories) = tokio::join!(
        transaction::list(&state.db, &identity.id, &filter),
        category::list_distinct_names(&state.db, &identity.id),
    );

    Ok(Json(TransactionsPage {
        transactions: or_empty("transactions", &identity.id, rows),
        categories: or_empty("categories", &identity.id, categories),
    }))
}

/// `GET /categories`
pub async fn categories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<Vec<CategoryModel>> {
    let categories = category::list(&state.db, &identity.id).await;
    Json(or_empty("categories", &identity.id, categories))
}

/// Query string of the budgets page.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// `YYYY-MM`; the current month when absent
    pub month: Option<String>,
}

/// `GET /budgets?month=YYYY-MM`
pub async fn budgets(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<BudgetQuery>,
) -> Result<Json<BudgetSummary>, ApiError> {
    let month = match query.month.as_deref().map(str::trim) {
        None | Some("") => Month::current(),
        Some(month) => month.parse()?,
    };
    Ok(Json(budget::budget_summary(&state.db, &identity.id, month).await))
}

/// Descriptor of an auth page; the form itself posts to the identity provider.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    /// `signin` or `signup`
    pub page: &'static str,
    /// Page heading
    pub title: &'static str,
    /// Link to the other auth page
    pub alternate: &'static str,
}

/// `GET /signin`
pub async fn signin() -> Json<AuthPage> {
    Json(AuthPage {
        page: "signin",
        title: "Sign in to your account",
        alternate: "/signup",
    })
}

/// `GET /signup`
pub async fn signup() -> Json<AuthPage> {
    Json(AuthPage {
        page: "signup",
        title: "Create your account",
        alternate: "/signin",
    })
}

/// `POST /signout` - ends the session and clears the token cookie.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = gate::access_token(&headers) {
        match state.identity.sign_out(&token).await {
            Ok(()) => info!("Signed out"),
            Err(e) => warn!(error = %e, "Sign-out failed at the identity provider"),
        }
    }

    let mut response = Redirect::to(SIGN_IN_PATH).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("access_token=; Path=/; Max-Age=0; HttpOnly"),
    );
    response
}

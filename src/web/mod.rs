//! HTTP surface - the axum router, shared state and server loop.

/// JSON API for category and transaction writes
pub mod api;
/// Error responses
pub mod error;
/// Session gate middleware and route policy
pub mod gate;
/// Page view models
pub mod pages;

use crate::{auth::IdentityProvider, errors::Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Request-independent state shared by every handler.
///
/// The database handle is a pool and cheap to clone; nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    /// Store connection
    pub db: DatabaseConnection,
    /// Identity provider
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Bundles the store and identity provider.
    pub fn new(db: DatabaseConnection, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }
}

/// Builds the application router. Everything except `/health` sits behind the gate.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/transactions", get(pages::transactions))
        .route("/categories", get(pages::categories))
        .route("/budgets", get(pages::budgets))
        .route("/signin", get(pages::signin))
        .route("/signup", get(pages::signup))
        .route("/signout", post(pages::signout))
        .route(
            "/api/categories",
            get(api::list_categories)
                .post(api::create_category)
                .put(api::update_category)
                .delete(api::delete_category),
        )
        .route(
            "/api/transactions",
            get(api::list_transactions)
                .post(api::create_transaction)
                .put(api::update_transaction)
                .delete(api::delete_transaction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::session_gate,
        ))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Binds `bind` and serves the router until the process is stopped.
pub async fn run_server(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        auth::{Identity, StaticIdentityProvider},
        entities::Kind,
        test_utils::*,
    };
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TOKEN: &str = "token-1";
    const OTHER_TOKEN: &str = "token-2";

    fn provider() -> Arc<dyn IdentityProvider> {
        Arc::new(StaticIdentityProvider::new([
            (
                TOKEN.to_string(),
                Identity {
                    id: OWNER.to_string(),
                    email: "one@example.com".to_string(),
                },
            ),
            (
                OTHER_TOKEN.to_string(),
                Identity {
                    id: OTHER_OWNER.to_string(),
                    email: "two@example.com".to_string(),
                },
            ),
        ]))
    }

    async fn app() -> (Router, DatabaseConnection) {
        let db = setup_test_db().await.unwrap();
        (router(AppState::new(db.clone(), provider())), db)
    }

    async fn broken_app() -> Router {
        let db = setup_broken_db().await.unwrap();
        router(AppState::new(db, provider()))
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_protected_page_without_identity_redirects_to_signin() {
        let (app, _db) = app().await;

        for path in ["/dashboard", "/transactions", "/categories", "/budgets"] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, path, None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
            assert_eq!(location(&response), "/signin");
        }
    }

    #[tokio::test]
    async fn test_unknown_token_fails_closed() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(request(Method::GET, "/dashboard", Some("forged"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/signin");
    }

    #[tokio::test]
    async fn test_auth_only_page_with_identity_redirects_to_dashboard() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/signin", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/dashboard");

        let response = app
            .oneshot(request(Method::GET, "/signup", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["page"], "signup");
    }

    #[tokio::test]
    async fn test_root_redirects_by_session() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/dashboard");

        let response = app
            .oneshot(request(Method::GET, "/", None, None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/signin");
    }

    #[tokio::test]
    async fn test_cookie_token_is_accepted() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/categories")
                    .header(header::COOKIE, format!("access_token={TOKEN}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_without_identity_is_401_json() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(request(Method::GET, "/api/categories", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "User not authenticated");
    }

    #[tokio::test]
    async fn test_health_is_outside_the_gate() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_category_api_lifecycle() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/categories",
                Some(TOKEN),
                Some(json!({"name": "Food", "type": "expense", "budget_limit": "200"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["name"], "Food");
        assert_eq!(created["type"], "expense");
        assert_eq!(created["icon"], "💰");
        assert_eq!(created["user_id"], OWNER);
        let id = created["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/api/categories",
                Some(TOKEN),
                Some(json!({"id": id, "name": "Groceries", "type": "expense", "budget_limit": 250})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Groceries");

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/categories", Some(TOKEN), None))
            .await
            .unwrap();
        let listed = json_body(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(request(
                Method::DELETE,
                "/api/categories",
                Some(TOKEN),
                Some(json!({"id": id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], id);

        let response = app
            .oneshot(request(Method::GET, "/api/categories", Some(TOKEN), None))
            .await
            .unwrap();
        assert!(json_body(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_validation_is_400() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/categories",
                Some(TOKEN),
                Some(json!({"name": "  ", "type": "expense"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Category name is required");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/categories",
                Some(TOKEN),
                Some(json!({"name": 5})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let message = json_body(response).await["message"].as_str().unwrap().to_string();
        assert!(message.contains("name"), "{message}");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/transactions")
                    .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["message"].is_string());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/transactions")
                    .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                    .body(Body::from("amount=5"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(json_body(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_cross_owner_update_is_404_and_changes_nothing() {
        let (app, db) = app().await;
        let food = create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(200))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/api/categories",
                Some(OTHER_TOKEN),
                Some(json!({"id": food.id, "name": "Mine now", "type": "income"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request(
                Method::DELETE,
                "/api/categories",
                Some(OTHER_TOKEN),
                Some(json!({"id": food.id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let unchanged = crate::core::category::get(&db, food.id, OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "Food");
    }

    #[tokio::test]
    async fn test_transaction_api_create_and_filter() {
        let (app, db) = app().await;
        let food = create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(200))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/transactions",
                Some(TOKEN),
                Some(json!({
                    "amount": "12.50",
                    "type": "expense",
                    "category_id": food.id,
                    "description": "Lunch",
                    "date": "2024-06-10"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let amount: rust_decimal::Decimal = created["amount"].as_str().unwrap().parse().unwrap();
        assert_eq!(amount, dec!(12.50));
        assert_eq!(created["category_id"], food.id);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/transactions",
                Some(TOKEN),
                Some(json!({"amount": 0, "type": "expense", "date": "2024-06-10"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(request(
                Method::GET,
                "/api/transactions?type=expense&category=all&start_date=2024-06-01&end_date=2024-06-30",
                Some(TOKEN),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rows = json_body(response).await;
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["description"], "Lunch");
        assert_eq!(rows[0]["category"]["name"], "Food");

        let response = app
            .oneshot(request(
                Method::GET,
                "/api/transactions?start_date=2024-07-01&end_date=2024-06-01",
                Some(TOKEN),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_budgets_page() {
        let (app, db) = app().await;
        let food = create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(200))
            .await
            .unwrap();
        create_test_transaction(&db, OWNER, Some(food.id), Kind::Expense, dec!(110), june(5))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/budgets?month=2024-06", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let summary = json_body(response).await;
        assert_eq!(summary["month"], "2024-06");
        assert_eq!(summary["lines"][0]["status"], "good");
        assert_eq!(summary["lines"][0]["percentage_text"], "55.0%");

        let response = app
            .oneshot(request(Method::GET, "/budgets?month=June", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transactions_page_lists_distinct_category_options() {
        let (app, db) = app().await;
        create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(0))
            .await
            .unwrap();
        create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(0))
            .await
            .unwrap();

        let response = app
            .oneshot(request(Method::GET, "/transactions?type=all", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["categories"].as_array().unwrap().len(), 1);
        assert!(page["transactions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_page_reads_degrade_to_empty_lists_on_store_failure() {
        let app = broken_app().await;

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/transactions", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["transactions"], json!([]));
        assert_eq!(page["categories"], json!([]));

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/categories", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));

        // A bad filter is still rejected before any read
        let response = app
            .oneshot(request(Method::GET, "/transactions?type=savings", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signout_redirects_and_clears_cookie() {
        let (app, _db) = app().await;

        let response = app
            .oneshot(request(Method::POST, "/signout", Some(TOKEN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/signin");
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .starts_with("access_token=;")
        );
    }
}

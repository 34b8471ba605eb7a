//! Shared test utilities for `PocketLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        category,
        forms::{CategoryFields, DEFAULT_COLOR, DEFAULT_ICON, TransactionFields},
        transaction,
    },
    entities::{self, Kind},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Owner used by most tests.
pub const OWNER: &str = "user-1";
/// A second owner, for isolation checks.
pub const OTHER_OWNER: &str = "user-2";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// An in-memory database without tables: every query fails.
pub async fn setup_broken_db() -> Result<DatabaseConnection> {
    Ok(sea_orm::Database::connect("sqlite::memory:").await?)
}

/// June 2024, day `day`.
///
/// # Panics
/// Panics for days outside 1..=30.
#[allow(clippy::unwrap_used)]
pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Creates a category with default icon and color.
pub async fn create_test_category(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
    kind: Kind,
    budget_limit: Decimal,
) -> Result<entities::category::Model> {
    category::create(
        db,
        owner_id,
        CategoryFields {
            name: name.to_string(),
            kind,
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
            budget_limit,
        },
    )
    .await
}

/// Creates a non-recurring transaction with description `"Test transaction"`.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    owner_id: &str,
    category_id: Option<i64>,
    kind: Kind,
    amount: Decimal,
    date: NaiveDate,
) -> Result<entities::transaction::Model> {
    transaction::create(
        db,
        owner_id,
        TransactionFields {
            amount,
            kind,
            category_id,
            description: "Test transaction".to_string(),
            date,
            recurring: false,
            recurring_frequency: None,
        },
    )
    .await
}

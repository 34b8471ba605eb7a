//! Database configuration module for `PocketLedger`.
//!
//! This module handles the store connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema (including the
//! `transactions.category_id` cascade) always matches the Rust models.

use crate::entities::{Category, Transaction};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::info;

/// Default location of the local `SQLite` store.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/pocket_ledger.sqlite?mode=rwc";

/// Establishes a connection to the store at `database_url`.
///
/// The returned connection is a pool handle; clone it into request state and pass
/// it explicitly to accessor calls.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!(url = %redact(database_url), "Connecting to database");
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates the categories and transactions tables if they do not exist yet.
///
/// Categories are created first because transactions reference them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut transaction_table = schema.create_table_from_entity(Transaction);

    category_table.if_not_exists();
    transaction_table.if_not_exists();

    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    Ok(())
}

/// Strips credentials from a connection URL before it is logged.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

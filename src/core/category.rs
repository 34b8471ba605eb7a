//! Category business logic - owner-scoped create/read/update/delete.
//!
//! Every query filters by the caller's owner id; an id belonging to another owner
//! behaves exactly like an id that does not exist. Deleting a category removes its
//! transactions through the store's `ON DELETE CASCADE`.

use crate::{
    core::forms::CategoryFields,
    entities::{Category, Kind, category},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info};

/// Lists the owner's categories ordered by name.
pub async fn list(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(owner_id))
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the owner's categories with one entry per distinct name.
///
/// Used for filter options. Names are compared exactly; the first category in
/// name order wins.
pub async fn list_distinct_names(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<category::Model>> {
    Ok(dedupe_by_name(list(db, owner_id).await?))
}

/// Keeps the first category for each name, preserving order.
#[must_use]
pub fn dedupe_by_name(categories: Vec<category::Model>) -> Vec<category::Model> {
    let mut seen = HashSet::new();
    categories
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}

/// Lists the owner's categories of `kind` with a budget limit above zero, ordered by name.
pub async fn list_with_budget(
    db: &DatabaseConnection,
    owner_id: &str,
    kind: Kind,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(owner_id))
        .filter(category::Column::Kind.eq(kind))
        .filter(category::Column::BudgetLimit.gt(Decimal::ZERO))
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the owner's categories by id.
pub async fn get(
    db: &DatabaseConnection,
    id: i64,
    owner_id: &str,
) -> Result<Option<category::Model>> {
    Category::find_by_id(id)
        .filter(category::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category for the owner.
pub async fn create(
    db: &DatabaseConnection,
    owner_id: &str,
    fields: CategoryFields,
) -> Result<category::Model> {
    let model = category::ActiveModel {
        user_id: Set(owner_id.to_string()),
        name: Set(fields.name),
        kind: Set(fields.kind),
        icon: Set(fields.icon),
        color: Set(fields.color),
        budget_limit: Set(fields.budget_limit),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(category_id = created.id, owner = owner_id, "Created category");
    Ok(created)
}

/// Updates one of the owner's categories in place.
///
/// Returns [`Error::CategoryNotFound`] when the id does not exist for this owner.
pub async fn update(
    db: &DatabaseConnection,
    id: i64,
    owner_id: &str,
    fields: CategoryFields,
) -> Result<category::Model> {
    let existing = get(db, id, owner_id)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;

    let mut model: category::ActiveModel = existing.into();
    model.name = Set(fields.name);
    model.kind = Set(fields.kind);
    model.icon = Set(fields.icon);
    model.color = Set(fields.color);
    model.budget_limit = Set(fields.budget_limit);

    let updated = model.update(db).await?;
    debug!(category_id = id, owner = owner_id, "Updated category");
    Ok(updated)
}

/// Deletes one of the owner's categories; its transactions go with it.
///
/// Returns [`Error::CategoryNotFound`] when the id does not exist for this owner.
pub async fn delete(db: &DatabaseConnection, id: i64, owner_id: &str) -> Result<()> {
    let result = Category::delete_many()
        .filter(category::Column::Id.eq(id))
        .filter(category::Column::UserId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::CategoryNotFound { id });
    }

    info!(category_id = id, owner = owner_id, "Deleted category");
    Ok(())
}

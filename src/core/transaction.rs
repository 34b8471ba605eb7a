//! Transaction business logic - owner-scoped create/read/update/delete.
//!
//! Reads come back joined with the referenced category's display fields
//! ([`TransactionWithCategory`]), newest first. Writes validate that a referenced
//! category belongs to the same owner; ids owned by someone else are reported as
//! not found and nothing changes.

use crate::{
    core::{
        category,
        forms::{TransactionFields, TransactionFilter},
        report,
    },
    entities::{Category, Kind, Transaction, category as category_entity, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Select, Set, prelude::*};
use serde::Serialize;
use tracing::{debug, info};

/// Display fields of a transaction's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBadge {
    /// Category name
    pub name: String,
    /// Category icon
    pub icon: String,
    /// Category color
    pub color: String,
}

impl From<category_entity::Model> for CategoryBadge {
    fn from(model: category_entity::Model) -> Self {
        Self {
            name: model.name,
            icon: model.icon,
            color: model.color,
        }
    }
}

/// A transaction row with its category's display fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    /// The stored transaction
    #[serde(flatten)]
    pub transaction: transaction::Model,
    /// `None` when the transaction has no category
    pub category: Option<CategoryBadge>,
    /// Signed amount text, e.g. `-$12.50`
    pub display_amount: String,
}

impl From<(transaction::Model, Option<category_entity::Model>)> for TransactionWithCategory {
    fn from((transaction, category): (transaction::Model, Option<category_entity::Model>)) -> Self {
        Self {
            display_amount: report::format_transaction_amount(transaction.kind, transaction.amount),
            transaction,
            category: category.map(CategoryBadge::from),
        }
    }
}

/// Owner-scoped select joined with categories, newest first.
fn owned_with_category(owner_id: &str) -> sea_orm::SelectTwo<Transaction, Category> {
    Transaction::find()
        .find_also_related(Category)
        .filter(transaction::Column::UserId.eq(owner_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
}

/// Narrows a select with every present filter (AND semantics).
fn apply_filter<S>(mut select: S, filter: &TransactionFilter) -> S
where
    S: QueryFilter,
{
    if let Some(kind) = filter.kind {
        select = select.filter(transaction::Column::Kind.eq(kind));
    }
    if let Some(category_id) = filter.category_id {
        select = select.filter(transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(start) = filter.start_date {
        select = select.filter(transaction::Column::Date.gte(start));
    }
    if let Some(end) = filter.end_date {
        select = select.filter(transaction::Column::Date.lte(end));
    }
    select
}

/// Lists the owner's transactions matching `filter`, newest first.
pub async fn list(
    db: &DatabaseConnection,
    owner_id: &str,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionWithCategory>> {
    let rows = apply_filter(owned_with_category(owner_id), filter)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Lists the owner's transactions dated within `[start, end]`, optionally of one kind.
pub async fn in_range(
    db: &DatabaseConnection,
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    kind: Option<Kind>,
) -> Result<Vec<TransactionWithCategory>> {
    let filter = TransactionFilter {
        kind,
        start_date: Some(start),
        end_date: Some(end),
        ..Default::default()
    };
    list(db, owner_id, &filter).await
}

/// The owner's `limit` most recently created transactions.
pub async fn recent(
    db: &DatabaseConnection,
    owner_id: &str,
    limit: u64,
) -> Result<Vec<TransactionWithCategory>> {
    let rows = owned_with_category(owner_id).limit(limit).all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

fn owned(id: i64, owner_id: &str) -> Select<Transaction> {
    Transaction::find_by_id(id).filter(transaction::Column::UserId.eq(owner_id))
}

/// Finds one of the owner's transactions by id.
pub async fn get(
    db: &DatabaseConnection,
    id: i64,
    owner_id: &str,
) -> Result<Option<TransactionWithCategory>> {
    let row = owned(id, owner_id).find_also_related(Category).one(db).await?;
    Ok(row.map(Into::into))
}

/// Rejects a category reference the owner does not own.
async fn check_category(
    db: &DatabaseConnection,
    owner_id: &str,
    category_id: Option<i64>,
) -> Result<()> {
    if let Some(id) = category_id {
        if category::get(db, id, owner_id).await?.is_none() {
            return Err(Error::validation(
                "category_id",
                format!("Unknown category {id}"),
            ));
        }
    }
    Ok(())
}

/// Records a new transaction for the owner.
pub async fn create(
    db: &DatabaseConnection,
    owner_id: &str,
    fields: TransactionFields,
) -> Result<transaction::Model> {
    check_category(db, owner_id, fields.category_id).await?;

    let model = transaction::ActiveModel {
        user_id: Set(owner_id.to_string()),
        amount: Set(fields.amount),
        kind: Set(fields.kind),
        category_id: Set(fields.category_id),
        description: Set(fields.description),
        date: Set(fields.date),
        recurring: Set(fields.recurring),
        recurring_frequency: Set(fields.recurring_frequency),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        transaction_id = created.id,
        owner = owner_id,
        kind = %created.kind,
        "Created transaction"
    );
    Ok(created)
}

/// Replaces the fields of one of the owner's transactions.
///
/// Returns [`Error::TransactionNotFound`] when the id does not exist for this owner.
pub async fn update(
    db: &DatabaseConnection,
    id: i64,
    owner_id: &str,
    fields: TransactionFields,
) -> Result<transaction::Model> {
    let existing = owned(id, owner_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id })?;
    check_category(db, owner_id, fields.category_id).await?;

    let mut model: transaction::ActiveModel = existing.into();
    model.amount = Set(fields.amount);
    model.kind = Set(fields.kind);
    model.category_id = Set(fields.category_id);
    model.description = Set(fields.description);
    model.date = Set(fields.date);
    model.recurring = Set(fields.recurring);
    model.recurring_frequency = Set(fields.recurring_frequency);

    let updated = model.update(db).await?;
    debug!(transaction_id = id, owner = owner_id, "Updated transaction");
    Ok(updated)
}

/// Deletes one of the owner's transactions.
///
/// Returns [`Error::TransactionNotFound`] when the id does not exist for this owner.
pub async fn delete(db: &DatabaseConnection, id: i64, owner_id: &str) -> Result<()> {
    let result = Transaction::delete_many()
        .filter(transaction::Column::Id.eq(id))
        .filter(transaction::Column::UserId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id });
    }

    info!(transaction_id = id, owner = owner_id, "Deleted transaction");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::RecurringFrequency;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn fields(amount: rust_decimal::Decimal, category_id: Option<i64>) -> TransactionFields {
        TransactionFields {
            amount,
            kind: Kind::Expense,
            category_id,
            description: "Lunch".to_string(),
            date: june(10),
            recurring: false,
            recurring_frequency: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip_with_category() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(200)).await?;

        let created = create(&db, OWNER, fields(dec!(12.50), Some(food.id))).await?;

        let rows = list(&db, OWNER, &TransactionFilter::default()).await?;
        let matching: Vec<_> = rows
            .iter()
            .filter(|row| row.transaction.id == created.id)
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].transaction.amount, dec!(12.50));
        assert_eq!(matching[0].display_amount, "-$12.50");
        let badge = matching[0].category.as_ref().unwrap();
        assert_eq!(badge.name, "Food");
        assert_eq!(badge.icon, food.icon);
        assert_eq!(badge.color, food.color);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip_without_category() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create(&db, OWNER, fields(dec!(3), None)).await?;

        let rows = list(&db, OWNER, &TransactionFilter::default()).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.id, created.id);
        assert!(rows[0].category.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_other_owners_category() -> Result<()> {
        let db = setup_test_db().await?;
        let theirs =
            create_test_category(&db, OTHER_OWNER, "Food", Kind::Expense, dec!(200)).await?;

        let result = create(&db, OWNER, fields(dec!(5), Some(theirs.id))).await;
        assert!(matches!(
            result,
            Err(Error::Validation { field: "category_id", .. })
        ));
        assert!(list(&db, OWNER, &TransactionFilter::default()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_recurring_metadata_is_stored() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = fields(dec!(1200), None);
        input.recurring = true;
        input.recurring_frequency = Some(RecurringFrequency::Monthly);
        let created = create(&db, OWNER, input).await?;

        let fetched = get(&db, created.id, OWNER).await?.unwrap();
        assert!(fetched.transaction.recurring);
        assert_eq!(
            fetched.transaction.recurring_frequency,
            Some(RecurringFrequency::Monthly)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_combine_with_and() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, OWNER, "Food", Kind::Expense, dec!(0)).await?;
        let salary = create_test_category(&db, OWNER, "Salary", Kind::Income, dec!(0)).await?;

        create_test_transaction(&db, OWNER, Some(food.id), Kind::Expense, dec!(10), june(1)).await?;
        create_test_transaction(&db, OWNER, Some(food.id), Kind::Expense, dec!(20), june(20)).await?;
        create_test_transaction(&db, OWNER, Some(salary.id), Kind::Income, dec!(3000), june(15))
            .await?;
        create_test_transaction(&db, OTHER_OWNER, None, Kind::Expense, dec!(99), june(15)).await?;

        let all = list(&db, OWNER, &TransactionFilter::default()).await?;
        assert_eq!(all.len(), 3);

        let expenses = list(
            &db,
            OWNER,
            &TransactionFilter {
                kind: Some(Kind::Expense),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(expenses.len(), 2);

        let narrowed = list(
            &db,
            OWNER,
            &TransactionFilter {
                kind: Some(Kind::Expense),
                category_id: Some(food.id),
                start_date: Some(june(10)),
                end_date: Some(june(30)),
            },
        )
        .await?;
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].transaction.amount, dec!(20));

        let by_income_category = list(
            &db,
            OWNER,
            &TransactionFilter {
                category_id: Some(salary.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_income_category.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_in_range_is_inclusive() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_transaction(&db, OWNER, None, Kind::Expense, dec!(1), june(1)).await?;
        create_test_transaction(&db, OWNER, None, Kind::Expense, dec!(2), june(30)).await?;
        create_test_transaction(
            &db,
            OWNER,
            None,
            Kind::Expense,
            dec!(4),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
        .await?;

        let rows = in_range(&db, OWNER, june(1), june(30), Some(Kind::Expense)).await?;
        assert_eq!(rows.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first_with_limit() -> Result<()> {
        let db = setup_test_db().await?;

        let mut ids = Vec::new();
        for i in 1..=7 {
            let amount = rust_decimal::Decimal::from(i);
            let created =
                create_test_transaction(&db, OWNER, None, Kind::Expense, amount, june(i)).await?;
            ids.push(created.id);
        }

        let rows = recent(&db, OWNER, 5).await?;
        let got: Vec<i64> = rows.iter().map(|r| r.transaction.id).collect();
        let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(got, expected);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create(&db, OWNER, fields(dec!(10), None)).await?;

        let mut input = fields(dec!(15.75), None);
        input.kind = Kind::Income;
        input.description = "Refund".to_string();
        let updated = update(&db, created.id, OWNER, input).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.amount, dec!(15.75));
        assert_eq!(updated.kind, Kind::Income);
        assert_eq!(updated.description, "Refund");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_other_owners_transaction_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create(&db, OWNER, fields(dec!(10), None)).await?;

        let result = update(&db, created.id, OTHER_OWNER, fields(dec!(999), None)).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        let result = delete(&db, created.id, OTHER_OWNER).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        let unchanged = get(&db, created.id, OWNER).await?.unwrap();
        assert_eq!(unchanged.transaction.amount, dec!(10));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create(&db, OWNER, fields(dec!(10), None)).await?;

        delete(&db, created.id, OWNER).await?;
        assert!(get(&db, created.id, OWNER).await?.is_none());

        let again = delete(&db, created.id, OWNER).await;
        assert!(matches!(again, Err(Error::TransactionNotFound { .. })));

        Ok(())
    }
}

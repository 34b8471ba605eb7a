//! Category entity - an owner's income or expense bucket.
//!
//! Expense categories carry a monthly `budget_limit`; on income categories the same
//! column is a declared income figure. Zero means "no budget set".

use super::kind::Kind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity provider user id of the owner
    pub user_id: String,
    /// Display name; not unique per owner
    pub name: String,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Display icon (usually a single emoji)
    pub icon: String,
    /// Display color as `#RRGGBB`
    pub color: String,
    /// Monthly ceiling (expense) or declared capacity (income); never negative
    pub budget_limit: Decimal,
    /// When the category was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Transaction entity - a single income or expense record.
//!
//! `amount` is always a positive magnitude; `kind` carries the direction.
//! Deleting the referenced category deletes the transaction (`ON DELETE CASCADE`).
use super::kind::{Kind, RecurringFrequency};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity provider user id of the owner
    pub user_id: String,
    /// Positive magnitude
    pub amount: Decimal,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Category this transaction is filed under, if any
    pub category_id: Option<i64>,
    /// Free-text description
    pub description: String,
    /// Calendar day of the transaction
    pub date: Date,
    /// Whether the transaction repeats
    pub recurring: bool,
    /// Repeat interval; only set when `recurring` is true
    pub recurring_frequency: Option<RecurringFrequency>,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction optionally belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

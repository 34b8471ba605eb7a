//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the owner-scoped tables and their relationships.

pub mod category;
pub mod kind;
pub mod transaction;

pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use kind::{Kind, RecurringFrequency};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};

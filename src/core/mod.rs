//! Core business logic - framework-agnostic accessors and aggregators.
//! Every function takes the database connection and the caller's owner id
//! explicitly; nothing here knows about HTTP.

use crate::errors::Result;
use tracing::warn;

pub mod budget;
pub mod category;
pub mod dashboard;
pub mod forms;
pub mod period;
pub mod report;
pub mod transaction;

pub use budget::{BudgetLine, BudgetStatus, BudgetSummary, BudgetTotals};
pub use dashboard::{DashboardSummary, ExpenseSlice, MonthStats, MonthlyTrend};
pub use period::Month;
pub use transaction::{CategoryBadge, TransactionWithCategory};

/// Degrades a failed read of one view section to an empty list.
///
/// Used where a page must still render when one of its reads fails.
pub fn or_empty<T>(section: &'static str, owner_id: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(owner = owner_id, section, error = %e, "Read failed, showing empty section");
        Vec::new()
    })
}

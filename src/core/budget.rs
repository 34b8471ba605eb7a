//! Budget aggregation - spend against each category's monthly limit.
//!
//! For a month, every expense category with a limit above zero gets a
//! [`BudgetLine`]: the month's expense transactions in that category are summed into
//! `spent`, and the ratio to the limit decides the [`BudgetStatus`].
//!
//! Status is classified on the uncapped percentage; the displayed percentage and the
//! progress bar width are capped at 100. The summary's income figure is the sum of
//! income-category limits (a declared capacity), not measured income.
//!
//! All sums and ratios are overflow-checked; a summary that cannot be represented is
//! reported as an error and rendered as [`BudgetSummary::empty`].

use crate::{
    core::{category, period::Month, report, transaction},
    entities::{Kind, category as category_entity, transaction as transaction_entity},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, error};

/// Percentage at which a line turns to [`BudgetStatus::Warning`].
pub const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Percentage at which a line turns to [`BudgetStatus::Over`].
pub const OVER_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Where a category stands against its limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Below 80%
    Good,
    /// 80% up to (not including) 100%
    Warning,
    /// 100% or more
    Over,
}

impl BudgetStatus {
    /// Classifies an uncapped spend percentage.
    #[must_use]
    pub fn classify(percentage: Decimal) -> Self {
        if percentage >= OVER_THRESHOLD {
            Self::Over
        } else if percentage >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Good
        }
    }

    /// Badge text shown next to a line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "On Track",
            Self::Warning => "Almost There",
            Self::Over => "Over Budget",
        }
    }
}

/// One category's budget standing for the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    /// Category id
    pub category_id: i64,
    /// Category name
    pub name: String,
    /// Category icon
    pub icon: String,
    /// Category color
    pub color: String,
    /// Monthly limit, always > 0
    pub budget_limit: Decimal,
    /// Sum of the month's expenses in this category
    pub spent: Decimal,
    /// `budget_limit - spent`, negative when over
    pub remaining: Decimal,
    /// Uncapped `spent / budget_limit * 100`
    pub percentage: Decimal,
    /// `percentage` clamped to `[0, 100]`; also the progress bar width
    pub display_percentage: Decimal,
    /// `display_percentage` with one decimal, e.g. `100.0%`
    pub percentage_text: String,
    /// `spent` as currency
    pub spent_text: String,
    /// `remaining` as currency
    pub remaining_text: String,
    /// Text progress bar of `display_percentage`
    pub progress_bar: String,
    /// Classification of the uncapped percentage
    pub status: BudgetStatus,
    /// Text for the status badge
    pub status_label: &'static str,
    /// Progress bar color: red when over, amber on warning, else the category color
    pub bar_color: String,
}

impl BudgetLine {
    /// Builds the line for `category` given what was spent in it.
    ///
    /// `None` if the percentage or remainder overflows.
    #[must_use]
    pub fn new(category: &category_entity::Model, spent: Decimal) -> Option<Self> {
        let limit = category.budget_limit;
        let percentage = if limit > Decimal::ZERO {
            report::percentage_of(spent, limit)?
        } else {
            Decimal::ZERO
        };
        let remaining = limit.checked_sub(spent)?;
        let display_percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let status = BudgetStatus::classify(percentage);
        let bar_color = match status {
            BudgetStatus::Over => "#EF4444".to_string(),
            BudgetStatus::Warning => "#F59E0B".to_string(),
            BudgetStatus::Good => category.color.clone(),
        };

        Some(Self {
            category_id: category.id,
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            budget_limit: limit,
            spent,
            remaining,
            percentage,
            display_percentage,
            percentage_text: report::format_percentage(display_percentage),
            spent_text: report::format_currency(spent),
            remaining_text: report::format_currency(remaining),
            progress_bar: report::format_progress_bar(display_percentage, None),
            status,
            status_label: status.label(),
            bar_color,
        })
    }

    /// Progress bar width in percent; equal to the capped display percentage.
    #[must_use]
    pub const fn bar_width(&self) -> Decimal {
        self.display_percentage
    }
}

/// Month-level budget figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetTotals {
    /// Sum of income-category limits; declared, not measured
    pub declared_income_capacity: Decimal,
    /// Sum of expense limits
    pub total_budget: Decimal,
    /// Sum of every line's `spent`
    pub total_spent: Decimal,
    /// `declared_income_capacity - total_spent`
    pub total_remaining: Decimal,
}

/// Budget view for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// The month summarized
    pub month: Month,
    /// One line per expense category with a limit, ordered by name
    pub lines: Vec<BudgetLine>,
    /// Aggregate figures
    pub totals: BudgetTotals,
}

impl BudgetSummary {
    /// Zero lines and zero totals; what a failed computation yields.
    #[must_use]
    pub fn empty(month: Month) -> Self {
        Self {
            month,
            lines: Vec::new(),
            totals: BudgetTotals::default(),
        }
    }
}

/// Computes the summary from already-fetched rows.
///
/// `expense_categories` and `income_categories` must already be restricted to
/// limits above zero. Only expense transactions dated inside `month` count as
/// spend. Line order follows `expense_categories`.
///
/// `None` if any sum or ratio overflows.
#[must_use]
pub fn summarize(
    month: Month,
    expense_categories: &[category_entity::Model],
    income_categories: &[category_entity::Model],
    expenses: &[transaction_entity::Model],
) -> Option<BudgetSummary> {
    let declared_income_capacity =
        report::checked_total(income_categories.iter().map(|c| c.budget_limit))?;

    let lines = expense_categories
        .iter()
        .map(|category| {
            let spent = report::checked_total(
                expenses
                    .iter()
                    .filter(|t| t.kind == Kind::Expense && t.category_id == Some(category.id))
                    .filter(|t| month.contains(t.date))
                    .map(|t| t.amount),
            )?;
            BudgetLine::new(category, spent)
        })
        .collect::<Option<Vec<BudgetLine>>>()?;

    let total_budget = report::checked_total(lines.iter().map(|l| l.budget_limit))?;
    let total_spent = report::checked_total(lines.iter().map(|l| l.spent))?;

    Some(BudgetSummary {
        month,
        lines,
        totals: BudgetTotals {
            declared_income_capacity,
            total_budget,
            total_spent,
            total_remaining: declared_income_capacity.checked_sub(total_spent)?,
        },
    })
}

async fn try_summary(
    db: &DatabaseConnection,
    owner_id: &str,
    month: Month,
) -> Result<BudgetSummary> {
    let expense_categories = category::list_with_budget(db, owner_id, Kind::Expense).await?;
    let income_categories = category::list_with_budget(db, owner_id, Kind::Income).await?;

    let (start, end) = month.date_range();
    let expenses: Vec<transaction_entity::Model> =
        transaction::in_range(db, owner_id, start, end, Some(Kind::Expense))
            .await?
            .into_iter()
            .map(|row| row.transaction)
            .collect();

    debug!(
        owner = owner_id,
        %month,
        categories = expense_categories.len(),
        transactions = expenses.len(),
        "Computing budget summary"
    );
    summarize(month, &expense_categories, &income_categories, &expenses).ok_or(
        Error::Overflow {
            context: "budget summary",
        },
    )
}

/// Computes the owner's budget summary for `month`.
///
/// Any store failure or overflow yields [`BudgetSummary::empty`] rather than a
/// partial result.
pub async fn budget_summary(db: &DatabaseConnection, owner_id: &str, month: Month) -> BudgetSummary {
    match try_summary(db, owner_id, month).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(owner = owner_id, %month, error = %e, "Budget summary failed");
            BudgetSummary::empty(month)
        }
    }
}

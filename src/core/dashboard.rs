//! Dashboard aggregation - the month at a glance plus chart series.
//!
//! Four owner-scoped reads run concurrently: the current month's transactions, the
//! most recent transactions, the trend window, and the category list. A read that
//! fails is logged and treated as empty; the other sections still render. A section
//! whose sums overflow is likewise logged and shown zeroed.

use crate::{
    core::{
        category, or_empty,
        period::{self, Month},
        report,
        transaction::{self, TransactionWithCategory},
    },
    entities::{Kind, category as category_entity},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How many transactions the recent activity list shows.
pub const RECENT_LIMIT: u64 = 5;

/// Measured totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    /// Sum of the month's income transactions
    pub measured_monthly_income: Decimal,
    /// Sum of the month's expense transactions
    pub expenses: Decimal,
    /// `measured_monthly_income - expenses`
    pub total_balance: Decimal,
    /// `total_balance` as currency
    pub total_balance_text: String,
    /// See [`savings_rate`]
    pub savings_rate: Decimal,
    /// `savings_rate` with one decimal
    pub savings_rate_text: String,
}

impl Default for MonthStats {
    fn default() -> Self {
        Self {
            measured_monthly_income: Decimal::ZERO,
            expenses: Decimal::ZERO,
            total_balance: Decimal::ZERO,
            total_balance_text: report::format_currency(Decimal::ZERO),
            savings_rate: Decimal::ZERO,
            savings_rate_text: report::format_percentage(Decimal::ZERO),
        }
    }
}

impl MonthStats {
    /// Sums `rows` by kind. `None` on overflow.
    #[must_use]
    pub fn from_rows(rows: &[TransactionWithCategory]) -> Option<Self> {
        let total = |kind: Kind| {
            report::checked_total(
                rows.iter()
                    .filter(|row| row.transaction.kind == kind)
                    .map(|row| row.transaction.amount),
            )
        };
        let income = total(Kind::Income)?;
        let expenses = total(Kind::Expense)?;
        let balance = income.checked_sub(expenses)?;
        let rate = savings_rate(income, expenses)?;

        Some(Self {
            measured_monthly_income: income,
            expenses,
            total_balance: balance,
            total_balance_text: report::format_currency(balance),
            savings_rate: rate,
            savings_rate_text: report::format_percentage(rate),
        })
    }
}

/// `(income - expenses) / income * 100`, or 0 when there is no income.
///
/// `None` on overflow.
#[must_use]
pub fn savings_rate(income: Decimal, expenses: Decimal) -> Option<Decimal> {
    if income > Decimal::ZERO {
        report::percentage_of(income.checked_sub(expenses)?, income)
    } else {
        Some(Decimal::ZERO)
    }
}

/// One slice of the expense-by-category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseSlice {
    /// Category id
    pub category_id: i64,
    /// Slice label
    pub name: String,
    /// Slice color
    pub color: String,
    /// Summed expense amount, always > 0
    pub total: Decimal,
}

/// Groups expense rows by category, dropping uncategorized rows and empty totals.
///
/// Slices are ordered by name, then category id. `None` if a total overflows.
#[must_use]
pub fn expense_distribution(rows: &[TransactionWithCategory]) -> Option<Vec<ExpenseSlice>> {
    let mut by_category: BTreeMap<i64, ExpenseSlice> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.transaction.kind == Kind::Expense) {
        let (Some(category_id), Some(badge)) = (row.transaction.category_id, &row.category)
        else {
            continue;
        };
        let slice = by_category
            .entry(category_id)
            .or_insert_with(|| ExpenseSlice {
                category_id,
                name: badge.name.clone(),
                color: badge.color.clone(),
                total: Decimal::ZERO,
            });
        slice.total = slice.total.checked_add(row.transaction.amount)?;
    }

    let mut slices: Vec<ExpenseSlice> = by_category
        .into_values()
        .filter(|slice| slice.total > Decimal::ZERO)
        .collect();
    slices.sort_by(|a, b| a.name.cmp(&b.name).then(a.category_id.cmp(&b.category_id)));
    Some(slices)
}

/// Income and expense per month, as aligned chart series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// Sortable month keys, e.g. `2024-06`, ascending
    pub months: Vec<Month>,
    /// Chart labels, e.g. `Jun 24`
    pub labels: Vec<String>,
    /// Income per month
    pub income: Vec<Decimal>,
    /// Expense per month
    pub expense: Vec<Decimal>,
}

/// Buckets rows by calendar month and keeps the last
/// [`period::TREND_WINDOW_MONTHS`] months that have data.
///
/// Months without transactions are absent, not zero-filled. `None` if a bucket
/// overflows.
#[must_use]
pub fn monthly_trend(rows: &[TransactionWithCategory]) -> Option<MonthlyTrend> {
    let mut buckets: BTreeMap<Month, (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let (income, expense) = buckets
            .entry(Month::containing(row.transaction.date))
            .or_default();
        let bucket = match row.transaction.kind {
            Kind::Income => income,
            Kind::Expense => expense,
        };
        *bucket = bucket.checked_add(row.transaction.amount)?;
    }

    let keep = period::TREND_WINDOW_MONTHS as usize;
    let skip = buckets.len().saturating_sub(keep);

    let mut trend = MonthlyTrend::default();
    for (month, (income, expense)) in buckets.into_iter().skip(skip) {
        trend.months.push(month);
        trend.labels.push(month.chart_label());
        trend.income.push(income);
        trend.expense.push(expense);
    }
    Some(trend)
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Date the summary was computed for
    pub today: NaiveDate,
    /// Month containing `today`
    pub month: Month,
    /// Current-month totals
    pub stats: MonthStats,
    /// Most recently created transactions, newest first
    pub recent: Vec<TransactionWithCategory>,
    /// Expense-by-category chart over the trend window
    pub expense_distribution: Vec<ExpenseSlice>,
    /// Income/expense trend chart
    pub monthly_trend: MonthlyTrend,
    /// The owner's categories, for the chart legend
    pub categories: Vec<category_entity::Model>,
}

fn or_zeroed<T: Default>(section: &'static str, owner_id: &str, figures: Option<T>) -> T {
    figures.unwrap_or_else(|| {
        warn!(owner = owner_id, section, "Dashboard figures overflowed, showing zeroed section");
        T::default()
    })
}

/// Builds the owner's dashboard as of `today`.
pub async fn summarize_at(
    db: &DatabaseConnection,
    owner_id: &str,
    today: NaiveDate,
) -> DashboardSummary {
    let month = Month::containing(today);
    let (month_start, month_end) = month.date_range();
    let (trend_start, trend_end) = period::trend_window(today);

    let (current, recent, trend, categories) = tokio::join!(
        transaction::in_range(db, owner_id, month_start, month_end, None),
        transaction::recent(db, owner_id, RECENT_LIMIT),
        transaction::in_range(db, owner_id, trend_start, trend_end, None),
        category::list(db, owner_id),
    );

    let current = or_empty("current_month", owner_id, current);
    let recent = or_empty("recent", owner_id, recent);
    let trend = or_empty("trend", owner_id, trend);
    let categories = or_empty("categories", owner_id, categories);

    debug!(
        owner = owner_id,
        %month,
        current = current.len(),
        trend = trend.len(),
        "Computed dashboard"
    );

    DashboardSummary {
        today,
        month,
        stats: or_zeroed("current_month", owner_id, MonthStats::from_rows(&current)),
        recent,
        expense_distribution: or_zeroed(
            "expense_distribution",
            owner_id,
            expense_distribution(&trend),
        ),
        monthly_trend: or_zeroed("trend", owner_id, monthly_trend(&trend)),
        categories,
    }
}

/// Builds the owner's dashboard as of today's local date.
pub async fn summarize(db: &DatabaseConnection, owner_id: &str) -> DashboardSummary {
    summarize_at(db, owner_id, chrono::Local::now().date_naive()).await
}

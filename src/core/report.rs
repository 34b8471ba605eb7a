//! Display formatting for money and progress.
//!
//! This module turns decimals into the strings the views show: currency amounts,
//! signed transaction amounts, one-decimal percentages and a text progress bar.
//! It also holds the overflow-checked sums and ratios the aggregators build those
//! figures from.

use crate::entities::Kind;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums `values`, or `None` if the total leaves the `Decimal` range.
#[must_use]
pub fn checked_total(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// `part / whole * 100`, or `None` on overflow. A zero `whole` gives zero.
#[must_use]
pub fn percentage_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// Formats an amount as currency, e.g. `$110.00` or `-$5.50`.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round(amount, 2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Formats a transaction amount with the sign implied by its kind,
/// e.g. `+$50.00` for income and `-$25.50` for an expense.
#[must_use]
pub fn format_transaction_amount(kind: Kind, amount: Decimal) -> String {
    let sign = match kind {
        Kind::Income => '+',
        Kind::Expense => '-',
    };
    format!("{sign}${:.2}", round(amount.abs(), 2))
}

/// Formats a percentage with one decimal, e.g. `55.0%`.
#[must_use]
pub fn format_percentage(percentage: Decimal) -> String {
    format!("{:.1}%", round(percentage, 1))
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`. The fill is
/// clamped to `[0, 100]`; the printed number is whatever was passed in.
#[must_use]
pub fn format_progress_bar(percentage: Decimal, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

    let filled = round(clamped * Decimal::from(length) / Decimal::ONE_HUNDRED, 0)
        .to_usize()
        .unwrap_or(0)
        .min(length);
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(empty),
        format_percentage(percentage)
    )
}

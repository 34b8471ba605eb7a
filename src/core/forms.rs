//! Typed inputs for the accessors.
//!
//! Each `*Form` is the loose shape a client submits (strings, blanks, numbers or
//! numeric strings). `validate` turns it into the strict `*Fields` value the
//! accessors accept, so validation happens once, before any store call.

use crate::{
    entities::{Kind, RecurringFrequency},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Icon used when a category form leaves it blank.
pub const DEFAULT_ICON: &str = "💰";
/// Color used when a category form leaves it blank.
pub const DEFAULT_COLOR: &str = "#3B82F6";
/// Largest amount or budget limit a form accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Money is kept to cents.
pub const MONEY_SCALE: u32 = 2;

/// Raw category create/update input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    /// Required display name
    #[serde(default)]
    pub name: String,
    /// `income` or `expense`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Display icon
    #[serde(default)]
    pub icon: Option<String>,
    /// Display color, `#RRGGBB`
    #[serde(default)]
    pub color: Option<String>,
    /// Number or numeric string; blank means 0
    #[serde(default)]
    pub budget_limit: Option<Value>,
}

/// Validated category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    /// Trimmed, non-empty name
    pub name: String,
    /// Income or expense
    pub kind: Kind,
    /// Display icon
    pub icon: String,
    /// Display color
    pub color: String,
    /// Non-negative limit
    pub budget_limit: Decimal,
}

impl CategoryForm {
    /// Validates the form into [`CategoryFields`].
    pub fn validate(&self) -> Result<CategoryFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "Category name is required"));
        }
        if self.kind.trim().is_empty() {
            return Err(Error::validation("type", "Category type is required"));
        }
        let kind = Kind::from_str(&self.kind)?;

        let budget_limit =
            parse_decimal("budget_limit", self.budget_limit.as_ref())?.unwrap_or(Decimal::ZERO);
        if budget_limit < Decimal::ZERO {
            return Err(Error::validation(
                "budget_limit",
                "Budget limit cannot be negative",
            ));
        }
        check_money("budget_limit", budget_limit)?;

        let icon = non_blank(self.icon.as_deref()).unwrap_or(DEFAULT_ICON);
        let color = non_blank(self.color.as_deref()).unwrap_or(DEFAULT_COLOR);
        if !is_hex_color(color) {
            return Err(Error::validation(
                "color",
                format!("Invalid color '{color}': expected #RRGGBB"),
            ));
        }

        Ok(CategoryFields {
            name: name.to_string(),
            kind,
            icon: icon.to_string(),
            color: color.to_string(),
            budget_limit,
        })
    }
}

/// Raw transaction create/update input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForm {
    /// Number or numeric string; must be > 0
    #[serde(default)]
    pub amount: Option<Value>,
    /// `income` or `expense`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Category id; null/blank for none
    #[serde(default)]
    pub category_id: Option<Value>,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Recurring flag
    #[serde(default)]
    pub recurring: bool,
    /// Repeat interval, defaults to monthly
    #[serde(default)]
    pub recurring_frequency: Option<String>,
}

/// Validated transaction fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    /// Positive magnitude
    pub amount: Decimal,
    /// Income or expense
    pub kind: Kind,
    /// Category reference, checked for ownership by the accessor
    pub category_id: Option<i64>,
    /// Trimmed description
    pub description: String,
    /// Calendar day
    pub date: NaiveDate,
    /// Recurring flag
    pub recurring: bool,
    /// Set only when `recurring` is true
    pub recurring_frequency: Option<RecurringFrequency>,
}

impl TransactionForm {
    /// Validates the form into [`TransactionFields`].
    pub fn validate(&self) -> Result<TransactionFields> {
        let amount = parse_decimal("amount", self.amount.as_ref())?
            .ok_or_else(|| Error::validation("amount", "Amount is required"))?;
        if amount <= Decimal::ZERO {
            return Err(Error::validation(
                "amount",
                format!("Amount must be greater than zero, got {amount}"),
            ));
        }
        check_money("amount", amount)?;

        if self.kind.trim().is_empty() {
            return Err(Error::validation("type", "Transaction type is required"));
        }
        let kind = Kind::from_str(&self.kind)?;

        let category_id = parse_id("category_id", self.category_id.as_ref())?;

        let date = parse_date("date", &self.date)?
            .ok_or_else(|| Error::validation("date", "Date is required"))?;

        let recurring_frequency = if self.recurring {
            Some(
                non_blank(self.recurring_frequency.as_deref())
                    .map(RecurringFrequency::from_str)
                    .transpose()?
                    .unwrap_or_default(),
            )
        } else {
            None
        };

        Ok(TransactionFields {
            amount,
            kind,
            category_id,
            description: self.description.trim().to_string(),
            date,
            recurring: self.recurring,
            recurring_frequency,
        })
    }
}

/// Raw transaction list filter, as found in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// `all`, `income` or `expense`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `all` or a category id
    pub category: Option<String>,
    /// Inclusive lower date bound
    pub start_date: Option<String>,
    /// Inclusive upper date bound
    pub end_date: Option<String>,
}

/// Validated transaction list filter. `None` means "no constraint".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only this kind
    pub kind: Option<Kind>,
    /// Only this category
    pub category_id: Option<i64>,
    /// On or after this date
    pub start_date: Option<NaiveDate>,
    /// On or before this date
    pub end_date: Option<NaiveDate>,
}

impl TransactionQuery {
    /// Validates the query into a [`TransactionFilter`].
    pub fn validate(&self) -> Result<TransactionFilter> {
        let kind = match non_blank(self.kind.as_deref()) {
            None | Some("all") => None,
            Some(kind) => Some(Kind::from_str(kind)?),
        };

        let category_id = match non_blank(self.category.as_deref()) {
            None | Some("all") => None,
            Some(id) => Some(id.parse::<i64>().map_err(|_| {
                Error::validation("category", format!("Invalid category id '{id}'"))
            })?),
        };

        let start_date = parse_date("start_date", self.start_date.as_deref().unwrap_or(""))?;
        let end_date = parse_date("end_date", self.end_date.as_deref().unwrap_or(""))?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(Error::validation(
                    "start_date",
                    "Start date must not be after end date",
                ));
            }
        }

        Ok(TransactionFilter {
            kind,
            category_id,
            start_date,
            end_date,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Bounds a non-negative money value to [`MAX_AMOUNT`] and whole cents.
fn check_money(field: &'static str, value: Decimal) -> Result<()> {
    if value > MAX_AMOUNT {
        return Err(Error::validation(
            field,
            format!("{field} must not exceed {MAX_AMOUNT}, got {value}"),
        ));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(Error::validation(
            field,
            format!("{field} has more than {MONEY_SCALE} decimal places: {value}"),
        ));
    }
    Ok(())
}

/// Reads a decimal from a JSON number or numeric string. Blank/null is `None`.
fn parse_decimal(field: &'static str, value: Option<&Value>) -> Result<Option<Decimal>> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(Error::validation(
                field,
                format!("Invalid number for {field}: {other}"),
            ));
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|_| Error::validation(field, format!("Invalid number for {field}: '{text}'")))
}

/// Reads an id from a JSON number or numeric string. Blank/null is `None`.
fn parse_id(field: &'static str, value: Option<&Value>) -> Result<Option<i64>> {
    let invalid = |v: String| Error::validation(field, format!("Invalid id for {field}: {v}"));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid(s.clone())),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| invalid(n.to_string())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::validation(field, format!("Invalid date '{value}': expected YYYY-MM-DD")))
}

//! Closed enumerations shared by the category and transaction tables.
//!
//! Both are persisted as lowercase strings so the stored rows stay readable
//! (`income`, `expense`, `monthly`, ...).

use crate::errors::{Error, Result};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Income/expense discriminator carried by categories and transactions.
///
/// Direction of money lives here; stored amounts are always non-negative magnitudes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl Kind {
    /// The persisted/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::validation(
                "type",
                format!("Invalid type '{other}': expected 'income' or 'expense'"),
            )),
        }
    }
}

/// How often a recurring transaction repeats.
///
/// Descriptive metadata only; future instances are never materialized.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    /// Every day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every week
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every month
    #[default]
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every year
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl FromStr for RecurringFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::validation(
                "recurring_frequency",
                format!("Invalid recurring frequency '{other}'"),
            )),
        }
    }
}

//! Running-total models and the adjustment arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::categories::Category;
use crate::constants::{
    CATEGORIES_COLLECTION, CATEGORY_TOTAL_KEY, TOTAL_BUDGET_KEY, TRANSACTIONS_COLLECTION,
    TRANSACTIONS_TOTAL_KEY,
};
use crate::errors::{Error, Result, ValidationError};
use crate::session::Session;
use crate::store::StorePath;
use crate::utils::parse_amount;

/// Which running total an adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    TotalBudget,
    TransactionsTotal,
    CategoryTotal(Category),
}

impl AggregateKind {
    /// Location of the scalar under the user's root.
    pub fn path(&self, session: &Session) -> StorePath {
        let root = session.root();
        match self {
            AggregateKind::TotalBudget => root.child(TOTAL_BUDGET_KEY),
            AggregateKind::TransactionsTotal => root
                .child(TRANSACTIONS_COLLECTION)
                .child(TRANSACTIONS_TOTAL_KEY),
            AggregateKind::CategoryTotal(category) => root
                .child(CATEGORIES_COLLECTION)
                .child(category.category_name())
                .child(CATEGORY_TOTAL_KEY),
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateKind::TotalBudget => f.write_str("total budget"),
            AggregateKind::TransactionsTotal => f.write_str("transactions total"),
            AggregateKind::CategoryTotal(category) => write!(f, "{} total", category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustSign {
    Add,
    Subtract,
}

/// How an adjustment reaches the store.
///
/// `ReadModifyWrite` reads, computes and writes as separate store calls, so
/// two adjustments racing on the same total can lose one update.
/// `Atomic` runs the same arithmetic inside the store's transaction primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomicityMode {
    #[default]
    ReadModifyWrite,
    Atomic,
}

impl fmt::Display for AtomicityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicityMode::ReadModifyWrite => f.write_str("read-modify-write"),
            AtomicityMode::Atomic => f.write_str("atomic"),
        }
    }
}

impl FromStr for AtomicityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read-modify-write" | "rmw" => Ok(AtomicityMode::ReadModifyWrite),
            "atomic" => Ok(AtomicityMode::Atomic),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown aggregate mode '{}'",
                other
            ))),
        }
    }
}

/// Applies `delta` to the current total.
///
/// An absent total becomes `delta` itself, whatever the sign: the first
/// record ever recorded establishes the aggregate. Fails when the result
/// does not fit in a `Decimal`.
pub fn apply_adjustment(
    current: Option<Decimal>,
    delta: Decimal,
    sign: AdjustSign,
) -> Result<Decimal> {
    let next = match (current, sign) {
        (None, _) => Some(delta),
        (Some(current), AdjustSign::Add) => current.checked_add(delta),
        (Some(current), AdjustSign::Subtract) => current.checked_sub(delta),
    };
    next.ok_or_else(|| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "adjusting {:?} by {:?} {} overflows",
            current, sign, delta
        )))
    })
}

/// Reads a stored total. Older writers stored bare numbers as well as strings.
pub fn decimal_from_value(value: &Value) -> Result<Decimal> {
    match value {
        Value::String(raw) => parse_amount(raw),
        Value::Number(number) => parse_amount(&number.to_string()),
        other => Err(Error::Validation(ValidationError::InvalidInput(format!(
            "stored total is not a number: {}",
            other
        )))),
    }
}

/// Stored total rendered for observers, unchanged from the store.
pub fn total_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

//! Transaction domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categories::Category;
use crate::errors::Result;
use crate::utils::parse_amount;

/// Transaction record as stored under `users/{uid}/transactions/{pushKey}`.
///
/// `time_stamp` is epoch milliseconds and doubles as the removal key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub category_name: String,
    pub transaction_name: String,
    pub transaction_amount: String,
    pub time_stamp: i64,
}

impl Transaction {
    pub fn amount_decimal(&self) -> Result<Decimal> {
        parse_amount(&self.transaction_amount)
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_name(&self.category_name)
    }
}

/// Transaction submission. A missing timestamp is filled with the current time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub category_name: String,
    pub transaction_name: String,
    pub transaction_amount: String,
    pub time_stamp: Option<i64>,
}

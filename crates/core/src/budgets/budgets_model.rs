//! Budget domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categories::Category;
use crate::errors::Result;
use crate::utils::parse_amount;

/// Budget record as stored under `users/{uid}/budgets/{pushKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub category_name: String,
    pub budget_name: String,
    pub budget_amount: String,
}

impl Budget {
    pub fn amount_decimal(&self) -> Result<Decimal> {
        parse_amount(&self.budget_amount)
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_name(&self.category_name)
    }
}

/// Budget as held in the loaded list: parsed category plus its push key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyBudget {
    pub id: String,
    pub category: Category,
    pub budget_name: String,
    pub budget_amount: String,
}

impl MyBudget {
    /// `None` when the stored category name is not a known category.
    pub fn from_stored(id: String, budget: Budget) -> Option<Self> {
        let category = budget.category()?;
        Some(MyBudget {
            id,
            category,
            budget_name: budget.budget_name,
            budget_amount: budget.budget_amount,
        })
    }
}

/// Budget submission. The category is optional because the form can be
/// submitted with nothing selected; validation reports that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category_name: Option<String>,
    pub budget_name: String,
    pub budget_amount: String,
}

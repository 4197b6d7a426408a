//! Form validation for budget and transaction submissions.
//!
//! Rules are pure string checks. Name uniqueness is checked against the
//! budgets currently loaded, never against the store.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::budgets::{MyBudget, NewBudget};
use crate::categories::Category;
use crate::transactions::NewTransaction;

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+[.][0-9][0-9]$").expect("amount pattern is valid"));

/// Digits, a dot, exactly two digits.
pub fn validate_amount(amount: &str) -> bool {
    AMOUNT_PATTERN.is_match(amount)
}

/// True when no loaded budget already uses `name`. Exact, case-sensitive match.
pub fn validate_unique_name(name: &str, loaded: &[MyBudget]) -> bool {
    !loaded.iter().any(|budget| budget.budget_name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameError {
    Empty,
    Duplicate,
}

/// Per-field errors of a rejected form; every failing field is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormErrors {
    pub name: Option<NameError>,
    pub amount_invalid: bool,
    pub category_missing: bool,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && !self.amount_invalid && !self.category_missing
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        match self.name {
            Some(NameError::Empty) => fields.push("name is empty"),
            Some(NameError::Duplicate) => fields.push("name already used"),
            None => {}
        }
        if self.amount_invalid {
            fields.push("amount is invalid");
        }
        if self.category_missing {
            fields.push("no category selected");
        }
        f.write_str(&fields.join(", "))
    }
}

/// Checks a budget submission against the loaded list. Returns the selected
/// category when every field passes.
pub fn validate_budget_form(
    form: &NewBudget,
    loaded: &[MyBudget],
) -> std::result::Result<Category, FormErrors> {
    let mut errors = FormErrors::default();

    if form.budget_name.is_empty() {
        errors.name = Some(NameError::Empty);
    } else if !validate_unique_name(&form.budget_name, loaded) {
        errors.name = Some(NameError::Duplicate);
    }
    if !validate_amount(&form.budget_amount) {
        errors.amount_invalid = true;
    }
    let category = form.category_name.as_deref().and_then(Category::from_name);
    if category.is_none() {
        errors.category_missing = true;
    }

    match category {
        Some(category) if errors.is_empty() => Ok(category),
        _ => Err(errors),
    }
}

/// Transaction submissions follow the same name and amount rules; names
/// need not be unique.
pub fn validate_transaction_form(form: &NewTransaction) -> std::result::Result<Category, FormErrors> {
    let mut errors = FormErrors::default();
    if form.transaction_name.is_empty() {
        errors.name = Some(NameError::Empty);
    }
    if !validate_amount(&form.transaction_amount) {
        errors.amount_invalid = true;
    }
    let category = Category::from_name(&form.category_name);
    if category.is_none() {
        errors.category_missing = true;
    }

    match category {
        Some(category) if errors.is_empty() => Ok(category),
        _ => Err(errors),
    }
}

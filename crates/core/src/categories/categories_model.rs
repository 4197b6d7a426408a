//! Spending categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// Closed set of categories a budget or transaction can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Groceries,
    Entertainment,
    Transportation,
    Subscriptions,
    Bills,
    PersonalSpending,
}

impl Category {
    /// Every category, in the order the picker shows them.
    pub const ALL: [Category; 6] = [
        Category::Groceries,
        Category::Entertainment,
        Category::Transportation,
        Category::Subscriptions,
        Category::Bills,
        Category::PersonalSpending,
    ];

    /// Display name, also the stored `categoryName` and the key under `categories/`.
    pub fn category_name(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::Transportation => "Transportation",
            Category::Subscriptions => "Subscriptions",
            Category::Bills => "Bills",
            Category::PersonalSpending => "Personal Spending",
        }
    }

    /// Lookup by display name; `None` for anything unknown.
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.category_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_name(s)
            .ok_or_else(|| Error::Validation(ValidationError::UnknownCategory(s.to_string())))
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.category_name().to_string()
    }
}

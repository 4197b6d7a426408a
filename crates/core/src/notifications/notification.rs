//! Messages fanned out to observers.

use serde::{Deserialize, Serialize};

use super::AddResult;
use crate::aggregates::AggregateKind;
use crate::budgets::{Budget, MyBudget};
use crate::category_budgets::CategoryBudget;
use crate::session::UserId;
use crate::transactions::Transaction;

/// A result republished to observers of one user's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    BudgetsLoaded {
        budgets: Vec<MyBudget>,
    },
    BudgetAdded {
        result: AddResult<Budget>,
    },
    TransactionsLoaded {
        transactions: Vec<Transaction>,
    },
    TransactionAdded {
        result: AddResult<Transaction>,
    },
    CategoryBudgetsLoaded {
        categories: Vec<CategoryBudget>,
    },
    /// `total` is `None` when the aggregate has never been written.
    AggregateChanged {
        kind: AggregateKind,
        total: Option<String>,
    },
}

/// A notification addressed to one user, as handed to sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    pub user_id: UserId,
    pub notification: Notification,
}

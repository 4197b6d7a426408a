//! Per-user observable slots and the hub routing notifications into them.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{
    AddResult, NoOpNotificationSink, Notification, NotificationSink, ObservableSlot,
    UserNotification,
};
use crate::aggregates::AggregateKind;
use crate::budgets::{Budget, MyBudget};
use crate::categories::Category;
use crate::category_budgets::CategoryBudget;
use crate::session::UserId;
use crate::transactions::Transaction;

/// The observable slots of one user. Each holds the last value published.
#[derive(Debug, Default)]
pub struct UserSlots {
    pub budgets: ObservableSlot<Vec<MyBudget>>,
    pub budget_added: ObservableSlot<AddResult<Budget>>,
    pub total_budget: ObservableSlot<Option<String>>,
    pub transactions: ObservableSlot<Vec<Transaction>>,
    pub transaction_added: ObservableSlot<AddResult<Transaction>>,
    pub transactions_total: ObservableSlot<Option<String>>,
    pub category_budgets: ObservableSlot<Vec<CategoryBudget>>,
    category_totals: HashMap<Category, ObservableSlot<Option<String>>>,
}

impl UserSlots {
    pub fn new() -> Self {
        UserSlots {
            category_totals: Category::ALL
                .into_iter()
                .map(|category| (category, ObservableSlot::new()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn category_total(&self, category: Category) -> Option<&ObservableSlot<Option<String>>> {
        self.category_totals.get(&category)
    }

    pub fn aggregate(&self, kind: AggregateKind) -> Option<&ObservableSlot<Option<String>>> {
        match kind {
            AggregateKind::TotalBudget => Some(&self.total_budget),
            AggregateKind::TransactionsTotal => Some(&self.transactions_total),
            AggregateKind::CategoryTotal(category) => self.category_total(category),
        }
    }

    fn apply(&self, notification: &Notification) {
        match notification {
            Notification::BudgetsLoaded { budgets } => self.budgets.publish(budgets.clone()),
            Notification::BudgetAdded { result } => self.budget_added.publish(result.clone()),
            Notification::TransactionsLoaded { transactions } => {
                self.transactions.publish(transactions.clone())
            }
            Notification::TransactionAdded { result } => {
                self.transaction_added.publish(result.clone())
            }
            Notification::CategoryBudgetsLoaded { categories } => {
                self.category_budgets.publish(categories.clone())
            }
            Notification::AggregateChanged { kind, total } => {
                if let Some(slot) = self.aggregate(*kind) {
                    slot.publish(total.clone());
                }
            }
        }
    }
}

/// Routes notifications to the publishing user's slots, then to the sink.
pub struct NotificationHub {
    users: RwLock<HashMap<UserId, Arc<UserSlots>>>,
    sink: Arc<dyn NotificationSink>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(Arc::new(NoOpNotificationSink))
    }
}

impl NotificationHub {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        NotificationHub {
            users: RwLock::new(HashMap::new()),
            sink,
        }
    }

    /// Slots of `user_id`, created on first use.
    pub fn slots(&self, user_id: &UserId) -> Arc<UserSlots> {
        if let Ok(users) = self.users.read() {
            if let Some(slots) = users.get(user_id) {
                return slots.clone();
            }
        }
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(UserSlots::new()))
            .clone()
    }

    pub fn publish(&self, user_id: &UserId, notification: Notification) {
        debug!("Publishing notification for {}", user_id);
        self.slots(user_id).apply(&notification);
        self.sink.emit(UserNotification {
            user_id: user_id.clone(),
            notification,
        });
    }

    /// Drops the slots of a signed-out user. Existing subscribers see no
    /// further values.
    pub fn release(&self, user_id: &UserId) -> bool {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.remove(user_id).is_some()
    }
}

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::budgets_model::{Budget, MyBudget, NewBudget};
use crate::errors::Result;
use crate::session::Session;

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    /// Reads the whole collection and publishes it as the loaded list.
    async fn load_budgets(&self, session: &Session) -> Result<Vec<MyBudget>>;

    /// The list last published for `session`, empty before the first load.
    fn loaded_budgets(&self, session: &Session) -> Vec<MyBudget>;

    async fn add_budget(&self, session: &Session, new_budget: NewBudget) -> Result<MyBudget>;

    /// Removes every budget named `budget_name` and returns what was removed.
    async fn remove_budget(&self, session: &Session, budget_name: &str) -> Result<Vec<Budget>>;

    async fn get_total_budget(&self, session: &Session) -> Result<Option<String>>;

    /// Keeps the total budget slot current until the handle is aborted.
    fn watch_total_budget(&self, session: &Session) -> JoinHandle<()>;

    /// Keeps the loaded list in step with writes from other clients until
    /// the handle is aborted.
    fn watch_budgets(&self, session: &Session) -> JoinHandle<()>;
}

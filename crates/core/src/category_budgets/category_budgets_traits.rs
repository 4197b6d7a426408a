use async_trait::async_trait;
use rust_decimal::Decimal;

use super::category_budgets_model::CategoryBudget;
use crate::categories::Category;
use crate::errors::Result;
use crate::session::Session;

/// Trait for per-category total operations
#[async_trait]
pub trait CategoryBudgetServiceTrait: Send + Sync {
    /// Every category that has a total, in category order.
    async fn get_category_budgets(&self, session: &Session) -> Result<Vec<CategoryBudget>>;

    async fn get_category_total(
        &self,
        session: &Session,
        category: Category,
    ) -> Result<Option<String>>;

    async fn add_to_category_total(
        &self,
        session: &Session,
        category: Category,
        amount: Decimal,
    ) -> Result<String>;

    async fn subtract_from_category_total(
        &self,
        session: &Session,
        category: Category,
        amount: Decimal,
    ) -> Result<String>;
}

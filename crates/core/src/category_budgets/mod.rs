//! Per-category budget totals.

mod category_budgets_model;
mod category_budgets_service;
mod category_budgets_traits;

pub use category_budgets_model::CategoryBudget;
pub use category_budgets_service::CategoryBudgetService;
pub use category_budgets_traits::CategoryBudgetServiceTrait;

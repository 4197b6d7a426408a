//! Per-category budget totals.

use serde::{Deserialize, Serialize};

/// One entry under `users/{uid}/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category_name: String,
    pub total: String,
}

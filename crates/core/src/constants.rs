/// Root segment under which every identity's data lives
pub const USERS_ROOT: &str = "users";

/// Per-user budgets collection
pub const BUDGETS_COLLECTION: &str = "budgets";

/// Per-user transactions collection
pub const TRANSACTIONS_COLLECTION: &str = "transactions";

/// Per-user category totals
pub const CATEGORIES_COLLECTION: &str = "categories";

/// Total budget aggregate, directly under the user root
pub const TOTAL_BUDGET_KEY: &str = "total_budget";

/// Transactions total aggregate, stored inside the transactions collection
pub const TRANSACTIONS_TOTAL_KEY: &str = "transactions_total";

/// Leaf holding a category's total
pub const CATEGORY_TOTAL_KEY: &str = "total";

/// Budget field used for removal queries
pub const BUDGET_NAME_FIELD: &str = "budgetName";

/// Transaction field used for removal queries
pub const TIMESTAMP_FIELD: &str = "timeStamp";

/// Preference key caching the total budget on the device
pub const TOTAL_BUDGET_PREF: &str = "total_budget";

/// Decimal places aggregates are written with
pub const AGGREGATE_DECIMAL_PLACES: u32 = 2;

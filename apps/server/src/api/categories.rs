use std::sync::Arc;

use crate::{
    api::budgets::TotalResponse,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    session::CurrentSession,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use budgetbook_core::categories::Category;
use budgetbook_core::category_budgets::CategoryBudget;

async fn list_category_budgets(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<CategoryBudget>>> {
    let categories = state
        .category_budget_service
        .get_category_budgets(&session)
        .await?;
    Ok(Json(categories))
}

async fn get_category_total(
    Path(category): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<TotalResponse>> {
    let category = Category::from_name(&category)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown category '{}'", category)))?;
    let total = state
        .category_budget_service
        .get_category_total(&session, category)
        .await?;
    Ok(Json(TotalResponse { total }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_category_budgets))
        .route("/categories/{category}/total", get(get_category_total))
}

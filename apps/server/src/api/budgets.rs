use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, session::CurrentSession};
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use budgetbook_core::budgets::{Budget, MyBudget, NewBudget};
use serde::Serialize;

#[derive(Serialize)]
pub struct TotalResponse {
    pub total: Option<String>,
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<MyBudget>>> {
    let budgets = state.budget_service.load_budgets(&session).await?;
    Ok(Json(budgets))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<NewBudget>,
) -> ApiResult<Json<MyBudget>> {
    // Uniqueness is checked against the loaded list, so make sure it is current.
    if state.budget_service.loaded_budgets(&session).is_empty() {
        state.budget_service.load_budgets(&session).await?;
    }
    let created = state.budget_service.add_budget(&session, payload).await?;
    Ok(Json(created))
}

async fn delete_budget(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<Budget>>> {
    let removed = state.budget_service.remove_budget(&session, &name).await?;
    Ok(Json(removed))
}

async fn get_total_budget(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<TotalResponse>> {
    let total = state.budget_service.get_total_budget(&session).await?;
    Ok(Json(TotalResponse { total }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/total", get(get_total_budget))
        .route("/budgets/{name}", delete(delete_budget))
}

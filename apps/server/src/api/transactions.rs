use std::sync::Arc;

use crate::{
    api::budgets::TotalResponse, error::ApiResult, main_lib::AppState, session::CurrentSession,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use budgetbook_core::transactions::{NewTransaction, Transaction};
use serde::Serialize;

#[derive(Serialize)]
struct BulkAddResponse {
    added: usize,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state.transaction_service.load_transactions(&session).await?;
    Ok(Json(transactions))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<NewTransaction>,
) -> ApiResult<Json<Transaction>> {
    let created = state
        .transaction_service
        .add_transaction(&session, payload)
        .await?;
    Ok(Json(created))
}

/// Re-adds previously removed transactions, keeping their timestamps.
async fn add_all_transactions(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<Vec<Transaction>>,
) -> ApiResult<Json<BulkAddResponse>> {
    let added = state
        .transaction_service
        .add_all_transactions(&session, payload)
        .await?;
    Ok(Json(BulkAddResponse { added }))
}

async fn remove_transactions(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<Vec<Transaction>>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let removed = state
        .transaction_service
        .remove_transactions(&session, &payload)
        .await?;
    Ok(Json(removed))
}

async fn get_transactions_total(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<TotalResponse>> {
    let total = state
        .transaction_service
        .get_transactions_total(&session)
        .await?;
    Ok(Json(TotalResponse { total }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/bulk", post(add_all_transactions))
        .route("/transactions/remove", post(remove_transactions))
        .route("/transactions/total", get(get_transactions_total))
}

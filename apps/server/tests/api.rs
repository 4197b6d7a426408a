use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use budgetbook_core::aggregates::AtomicityMode;
use budgetbook_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(10),
        aggregate_mode: AtomicityMode::Atomic,
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "u1");
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Totals are adjusted in the background after a write returns.
async fn wait_for_total(app: &Router, uri: &str, expected: &str) {
    for _ in 0..50 {
        let (_, body) = send(app, Method::GET, uri, None).await;
        if body["total"] == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} never reached {}", uri, expected);
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/budgets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let health = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn budget_lifecycle_keeps_totals() {
    let (app, _tmp) = build_test_router().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/budgets",
        Some(json!({"categoryName": "Bills", "budgetName": "Rent", "budgetAmount": "25.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["budgetName"], "Rent");
    wait_for_total(&app, "/api/v1/budgets/total", "25.00").await;
    wait_for_total(&app, "/api/v1/categories/Bills/total", "25.00").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/budgets",
        Some(json!({"categoryName": "Bills", "budgetName": "Rent", "budgetAmount": "5.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, removed) = send(&app, Method::DELETE, "/api/v1/budgets/Rent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed.as_array().unwrap().len(), 1);
    wait_for_total(&app, "/api/v1/budgets/total", "0.00").await;

    let (_, budgets) = send(&app, Method::GET, "/api/v1/budgets", None).await;
    assert_eq!(budgets, json!([]));
}

#[tokio::test]
async fn invalid_amount_is_a_bad_request() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({"categoryName": "Groceries", "transactionName": "Milk", "transactionAmount": "3.5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn transactions_can_be_removed_and_restored() {
    let (app, _tmp) = build_test_router().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({
            "categoryName": "Groceries",
            "transactionName": "Milk",
            "transactionAmount": "3.50",
            "timeStamp": 1_700_000_000_000i64
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    wait_for_total(&app, "/api/v1/transactions/total", "3.50").await;

    let (status, removed) = send(
        &app,
        Method::POST,
        "/api/v1/transactions/remove",
        Some(json!([created])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed.as_array().unwrap().len(), 1);
    wait_for_total(&app, "/api/v1/transactions/total", "0.00").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transactions/bulk",
        Some(removed),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 1);
    wait_for_total(&app, "/api/v1/transactions/total", "3.50").await;

    let (_, listed) = send(&app, Method::GET, "/api/v1/transactions", None).await;
    assert_eq!(listed[0]["timeStamp"], 1_700_000_000_000i64);
}

#[tokio::test]
async fn sign_out_clears_preferences() {
    let (app, _tmp) = build_test_router().await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/preferences/displayName",
        Some(json!({"value": "Sam"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/api/v1/preferences/displayName", None).await;
    assert_eq!(body["value"], "Sam");

    let (status, _) = send(&app, Method::POST, "/api/v1/session/sign-out", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/api/v1/preferences/displayName", None).await;
    assert_eq!(body["value"], "");
}

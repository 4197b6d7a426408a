use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, session::CurrentSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct PreferenceValue {
    value: String,
}

async fn get_preference(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<PreferenceValue>> {
    let value = state.preferences_service.read_string(&session, &key)?;
    Ok(Json(PreferenceValue { value }))
}

async fn put_preference(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<PreferenceValue>,
) -> ApiResult<StatusCode> {
    state
        .preferences_service
        .write_string(&session, &key, &body.value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Signing out clears the identity's preferences and drops its slots.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<StatusCode> {
    let cleared = state.preferences_service.delete_all(&session).await?;
    state.hub.release(session.user_id());
    tracing::info!(
        "Signed out {} and cleared {} preferences",
        session.user_id(),
        cleared
    );
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/preferences/{key}",
            get(get_preference).put(put_preference),
        )
        .route("/session/sign-out", post(sign_out))
}

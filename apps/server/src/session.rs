//! Identity extraction for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use budgetbook_core::Session;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity, taken from the `x-user-id` header set by the
/// authenticating proxy in front of the server.
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("invalid {} header", USER_ID_HEADER)))?;
        let session =
            Session::for_user(raw).map_err(|e| ApiError::Unauthorized(e.to_string()))?;
        Ok(CurrentSession(session))
    }
}

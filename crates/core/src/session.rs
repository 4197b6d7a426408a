//! Identity context passed into every store-facing call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::USERS_ROOT;
use crate::errors::{Error, Result, ValidationError};
use crate::store::StorePath;

/// Identifier of an authenticated user, as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier. Rejects empty ids and ids that would escape
    /// their path segment.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if !StorePath::is_valid_segment(trimmed) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "user id '{}' contains reserved characters",
                trimmed
            ))));
        }
        Ok(UserId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated identity a call acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Session { user_id }
    }

    pub fn for_user(raw: impl Into<String>) -> Result<Self> {
        Ok(Session::new(UserId::new(raw)?))
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// `users/{uid}`
    pub fn root(&self) -> StorePath {
        StorePath::root()
            .child(USERS_ROOT)
            .child(self.user_id.as_str())
    }
}

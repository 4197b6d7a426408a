//! Traits for the local preference store.

use async_trait::async_trait;

use crate::errors::Result;
use crate::session::Session;

/// Key-value persistence partitioned by scope. One scope per identity.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Raw value, `None` when the key was never written in `scope`.
    fn get_preference(&self, scope: &str, key: &str) -> Result<Option<String>>;

    async fn set_preference(&self, scope: &str, key: &str, value: &str) -> Result<()>;

    /// Clears every key of `scope`. Returns how many were removed.
    async fn delete_all(&self, scope: &str) -> Result<usize>;
}

/// Typed preference access for an authenticated identity.
#[async_trait]
pub trait PreferencesServiceTrait: Send + Sync {
    /// `""` when unset.
    fn read_string(&self, session: &Session, key: &str) -> Result<String>;

    async fn write_string(&self, session: &Session, key: &str, value: &str) -> Result<()>;

    /// `0.00` when unset.
    fn read_float(&self, session: &Session, key: &str) -> Result<f64>;

    async fn write_float(&self, session: &Session, key: &str, value: f64) -> Result<()>;

    async fn delete_all(&self, session: &Session) -> Result<usize>;
}

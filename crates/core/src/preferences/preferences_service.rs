use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use super::preferences_traits::{PreferenceStore, PreferencesServiceTrait};
use crate::errors::Result;
use crate::session::Session;

pub struct PreferencesService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PreferencesServiceTrait for PreferencesService {
    fn read_string(&self, session: &Session, key: &str) -> Result<String> {
        Ok(self
            .store
            .get_preference(session.user_id().as_str(), key)?
            .unwrap_or_default())
    }

    async fn write_string(&self, session: &Session, key: &str, value: &str) -> Result<()> {
        self.store
            .set_preference(session.user_id().as_str(), key, value)
            .await
    }

    fn read_float(&self, session: &Session, key: &str) -> Result<f64> {
        let raw = self.store.get_preference(session.user_id().as_str(), key)?;
        Ok(match raw {
            Some(raw) => raw.parse::<f64>().unwrap_or_else(|_| {
                warn!("Preference {} holds a non-numeric value '{}'", key, raw);
                0.0
            }),
            None => 0.0,
        })
    }

    async fn write_float(&self, session: &Session, key: &str, value: f64) -> Result<()> {
        self.store
            .set_preference(session.user_id().as_str(), key, &value.to_string())
            .await
    }

    async fn delete_all(&self, session: &Session) -> Result<usize> {
        let removed = self.store.delete_all(session.user_id().as_str()).await?;
        debug!("Cleared {} preference(s) for {}", removed, session.user_id());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStore;

    fn service() -> PreferencesService {
        PreferencesService::new(Arc::new(MemoryPreferenceStore::new()))
    }

    #[tokio::test]
    async fn test_defaults() {
        let prefs = service();
        let session = Session::for_user("u1").unwrap();
        assert_eq!(prefs.read_string(&session, "name").unwrap(), "");
        assert_eq!(prefs.read_float(&session, "total_budget").unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_scopes_are_per_identity() {
        let prefs = service();
        let alice = Session::for_user("alice").unwrap();
        let bob = Session::for_user("bob").unwrap();

        prefs.write_float(&alice, "total_budget", 120.5).await.unwrap();
        prefs.write_string(&alice, "name", "Alice").await.unwrap();

        assert_eq!(prefs.read_float(&alice, "total_budget").unwrap(), 120.5);
        assert_eq!(prefs.read_float(&bob, "total_budget").unwrap(), 0.0);

        assert_eq!(prefs.delete_all(&alice).await.unwrap(), 2);
        assert_eq!(prefs.read_string(&alice, "name").unwrap(), "");
    }

    #[tokio::test]
    async fn test_non_numeric_float_reads_default() {
        let prefs = service();
        let session = Session::for_user("u1").unwrap();
        prefs.write_string(&session, "total_budget", "lots").await.unwrap();
        assert_eq!(prefs.read_float(&session, "total_budget").unwrap(), 0.0);
    }
}

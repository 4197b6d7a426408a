use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::preferences_traits::PreferenceStore;
use crate::errors::{Error, Result};

/// Preference store kept in process memory.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    scopes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::Unexpected("preference store lock poisoned".to_string())
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    fn get_preference(&self, scope: &str, key: &str) -> Result<Option<String>> {
        let scopes = self.scopes.read().map_err(|_| poisoned())?;
        Ok(scopes.get(scope).and_then(|prefs| prefs.get(key)).cloned())
    }

    async fn set_preference(&self, scope: &str, key: &str, value: &str) -> Result<()> {
        let mut scopes = self.scopes.write().map_err(|_| poisoned())?;
        scopes
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_all(&self, scope: &str) -> Result<usize> {
        let mut scopes = self.scopes.write().map_err(|_| poisoned())?;
        Ok(scopes.remove(scope).map(|prefs| prefs.len()).unwrap_or(0))
    }
}

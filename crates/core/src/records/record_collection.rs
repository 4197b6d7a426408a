//! Typed access to a collection of push-keyed records.

use futures::future::join_all;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::store::{DocumentStore, Snapshot, StorePath};

/// A record together with the push key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord<T> {
    pub key: String,
    pub record: T,
}

/// Outcome of [`RecordCollection::remove_matching`]: the records actually
/// deleted, and the first delete that failed.
#[derive(Debug)]
pub struct Removal<T> {
    pub removed: Vec<StoredRecord<T>>,
    pub error: Option<Error>,
}

impl<T> Removal<T> {
    pub fn into_result(self) -> Result<Vec<StoredRecord<T>>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.removed),
        }
    }
}

/// Records of type `T` under one collection path.
pub struct RecordCollection<T> {
    store: Arc<dyn DocumentStore>,
    path: StorePath,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> RecordCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn DocumentStore>, path: StorePath) -> Self {
        Self {
            store,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Pushes `record` and returns its new key.
    pub async fn append(&self, record: &T) -> Result<String> {
        let value = serde_json::to_value(record)?;
        let key = self.store.push(&self.path, value).await?;
        debug!("Appended record {} to {}", key, self.path);
        Ok(key)
    }

    /// Appends every record concurrently. Each outcome is logged; one failure
    /// does not stop the others.
    pub async fn append_all(&self, records: &[T]) -> Vec<Result<String>> {
        let results = join_all(records.iter().map(|record| self.append(record))).await;
        for result in &results {
            match result {
                Ok(key) => debug!("Re-added record {} to {}", key, self.path),
                Err(e) => warn!("Failed to re-add record to {}: {}", self.path, e),
            }
        }
        results
    }

    /// Deletes every record whose `field` equals `value`.
    ///
    /// Fails only when the query fails. A failed delete does not hide the
    /// records that were deleted: they stay in [`Removal::removed`].
    pub async fn remove_matching(&self, field: &str, value: &Value) -> Result<Removal<T>> {
        let matches = self.store.query_equal_to(&self.path, field, value).await?;
        let outcomes =
            join_all(matches.iter().map(|snapshot| self.store.remove(snapshot.path()))).await;

        let mut removal = Removal {
            removed: Vec::with_capacity(matches.len()),
            error: None,
        };
        for (snapshot, outcome) in matches.iter().zip(outcomes) {
            match outcome {
                Ok(()) => removal.removed.extend(self.decode(snapshot)),
                Err(e) => {
                    warn!("Failed to remove {}: {}", snapshot.path(), e);
                    if removal.error.is_none() {
                        removal.error = Some(e);
                    }
                }
            }
        }
        debug!(
            "Removed {} of {} record(s) from {} where {} = {}",
            removal.removed.len(),
            matches.len(),
            self.path,
            field,
            value
        );
        Ok(removal)
    }

    /// Every record in key order, which is insertion order for push keys.
    pub async fn load_all(&self) -> Result<Vec<StoredRecord<T>>> {
        let snapshot = self.store.get(&self.path).await?;
        Ok(snapshot
            .children()
            .iter()
            .filter_map(|child| self.decode(child))
            .collect())
    }

    /// `None` for scalars living beside the records and for records that do
    /// not decode.
    pub fn decode(&self, snapshot: &Snapshot) -> Option<StoredRecord<T>> {
        let key = snapshot.key()?.to_string();
        if !snapshot.value().is_some_and(Value::is_object) {
            return None;
        }
        match snapshot.deserialize::<T>() {
            Ok(Some(record)) => Some(StoredRecord { key, record }),
            Ok(None) => None,
            Err(e) => {
                warn!("Skipping malformed record {} in {}: {}", key, self.path, e);
                None
            }
        }
    }
}

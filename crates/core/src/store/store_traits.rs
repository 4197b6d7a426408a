//! Document store contract.
//!
//! The store is a tree of JSON nodes addressed by [`StorePath`]. It is the
//! only persistence seam the services depend on; the in-memory store in this
//! crate and the SQLite store in `budgetbook-storage-sqlite` implement it.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{generate_push_key, Snapshot, StoreChange, StorePath, TransactionFn};
use crate::errors::Result;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Single-shot read of the node at `path`.
    async fn get(&self, path: &StorePath) -> Result<Snapshot>;

    /// Replaces the node at `path`. Last write wins; `Value::Null` removes it.
    async fn set(&self, path: &StorePath, value: Value) -> Result<()>;

    /// Atomically reads the node at `path`, applies `update` and writes the
    /// result. No other write to the store interleaves with it.
    async fn transaction(&self, path: &StorePath, update: TransactionFn) -> Result<Snapshot>;

    /// Receiver for every committed write. Listeners are built on this.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;

    async fn remove(&self, path: &StorePath) -> Result<()> {
        self.set(path, Value::Null).await
    }

    /// Appends `value` under a fresh push key and returns the key.
    async fn push(&self, collection: &StorePath, value: Value) -> Result<String> {
        let key = generate_push_key();
        self.set(&collection.child(&key), value).await?;
        Ok(key)
    }

    /// Children of `collection` whose `field` equals `value`, in key order.
    async fn query_equal_to(
        &self,
        collection: &StorePath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Snapshot>> {
        let snapshot = self.get(collection).await?;
        Ok(snapshot
            .children()
            .into_iter()
            .filter(|child| child.child(field).value() == Some(value))
            .collect())
    }
}

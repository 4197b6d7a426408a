//! In-process document store.
//!
//! Holds the whole tree in memory. Used by tests and by embedders that do not
//! need persistence.

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::sync::RwLock;
use tokio::sync::broadcast;

use super::tree::{normalize, value_at, write_at};
use super::{DocumentStore, Snapshot, StoreChange, StorePath, TransactionFn};
use crate::errors::{Error, Result};

/// Capacity of the change feed. Slow listeners past this lag and resync.
pub const CHANGE_FEED_CAPACITY: usize = 1024;

pub struct MemoryDocumentStore {
    tree: RwLock<Option<Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_FEED_CAPACITY);
        MemoryDocumentStore {
            tree: RwLock::new(None),
            changes,
        }
    }

    /// Store pre-populated with `document` at the root.
    pub fn with_document(document: Value) -> Self {
        let store = Self::new();
        if let Ok(mut tree) = store.tree.write() {
            *tree = normalize(document);
        }
        store
    }

    fn write(&self, path: &StorePath, value: Option<Value>) -> Result<StoreChange> {
        let mut tree = self
            .tree
            .write()
            .map_err(|_| Error::Store("document tree lock poisoned".to_string()))?;
        let before = write_at(&mut tree, path.segments(), value.clone());
        Ok(StoreChange {
            path: path.clone(),
            before,
            after: value,
        })
    }

    fn publish(&self, change: StoreChange) {
        if change.before != change.after {
            debug!("Store write at {}", change.path);
            // No listeners is fine.
            let _ = self.changes.send(change);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &StorePath) -> Result<Snapshot> {
        let tree = self
            .tree
            .read()
            .map_err(|_| Error::Store("document tree lock poisoned".to_string()))?;
        let value = value_at(tree.as_ref(), path.segments()).cloned();
        Ok(Snapshot::new(path.clone(), value))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        let change = self.write(path, normalize(value))?;
        self.publish(change);
        Ok(())
    }

    async fn transaction(&self, path: &StorePath, update: TransactionFn) -> Result<Snapshot> {
        let change = {
            let mut tree = self
                .tree
                .write()
                .map_err(|_| Error::Store("document tree lock poisoned".to_string()))?;
            let current = value_at(tree.as_ref(), path.segments()).cloned();
            let next = normalize(update(current)?);
            let before = write_at(&mut tree, path.segments(), next.clone());
            StoreChange {
                path: path.clone(),
                before,
                after: next,
            }
        };
        let snapshot = Snapshot::new(path.clone(), change.after.clone());
        self.publish(change);
        Ok(snapshot)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChildEventKind, ChildListener, ValueListener};
    use serde_json::json;
    use std::sync::Arc;

    fn budgets() -> StorePath {
        StorePath::parse("users/u1/budgets")
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryDocumentStore::new();
        let path = StorePath::parse("users/u1/total_budget");
        assert!(!store.get(&path).await.unwrap().exists());

        store.set(&path, json!("25.00")).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap().as_str(), Some("25.00"));

        store.remove(&path).await.unwrap();
        assert!(!store.get(&path).await.unwrap().exists());
        assert!(!store.get(&StorePath::parse("users")).await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_push_then_query_equal_to() {
        let store = MemoryDocumentStore::new();
        let first = store
            .push(&budgets(), json!({"budgetName": "Rent", "budgetAmount": "10.00"}))
            .await
            .unwrap();
        store
            .push(&budgets(), json!({"budgetName": "Food", "budgetAmount": "5.00"}))
            .await
            .unwrap();
        let third = store
            .push(&budgets(), json!({"budgetName": "Rent", "budgetAmount": "7.00"}))
            .await
            .unwrap();

        let matches = store
            .query_equal_to(&budgets(), "budgetName", &json!("Rent"))
            .await
            .unwrap();
        let keys: Vec<_> = matches.iter().map(|s| s.key().unwrap()).collect();
        assert_eq!(keys, vec![first.as_str(), third.as_str()]);
    }

    #[tokio::test]
    async fn test_transaction_sees_current_value() {
        let store = MemoryDocumentStore::with_document(json!({"n": "1"}));
        let path = StorePath::parse("n");
        let snapshot = store
            .transaction(
                &path,
                Box::new(|current| {
                    assert_eq!(current, Some(json!("1")));
                    Ok(json!("2"))
                }),
            )
            .await
            .unwrap();
        assert_eq!(snapshot.as_str(), Some("2"));
    }

    #[tokio::test]
    async fn test_value_listener_reports_initial_and_distinct_values() {
        let store = Arc::new(MemoryDocumentStore::new());
        let path = StorePath::parse("users/u1/total_budget");
        let mut listener = ValueListener::new(store.clone(), path.clone());

        assert!(!listener.next().await.unwrap().unwrap().exists());

        store.set(&path, json!("1.00")).await.unwrap();
        store
            .set(&StorePath::parse("users/u2/total_budget"), json!("9.00"))
            .await
            .unwrap();
        store.set(&path, json!("2.00")).await.unwrap();

        assert_eq!(listener.next().await.unwrap().unwrap().as_str(), Some("1.00"));
        assert_eq!(listener.next().await.unwrap().unwrap().as_str(), Some("2.00"));
    }

    #[tokio::test]
    async fn test_value_listener_follows_ancestor_writes_in_order() {
        let store = Arc::new(MemoryDocumentStore::new());
        let path = StorePath::parse("users/u1/total_budget");
        let mut listener = ValueListener::new(store.clone(), path.clone());
        assert!(!listener.next().await.unwrap().unwrap().exists());

        let user = StorePath::parse("users/u1");
        store.set(&user, json!({"total_budget": "3.00"})).await.unwrap();
        store.set(&user, json!({"total_budget": "3.00", "x": 1})).await.unwrap();
        store.set(&path, json!("4.00")).await.unwrap();
        store.remove(&user).await.unwrap();

        assert_eq!(listener.next().await.unwrap().unwrap().as_str(), Some("3.00"));
        assert_eq!(listener.next().await.unwrap().unwrap().as_str(), Some("4.00"));
        assert!(!listener.next().await.unwrap().unwrap().exists());
    }

    #[tokio::test]
    async fn test_child_listener_replays_then_tracks_removals() {
        let store = Arc::new(MemoryDocumentStore::new());
        let key = store
            .push(&budgets(), json!({"budgetName": "Rent", "budgetAmount": "10.00"}))
            .await
            .unwrap();
        let mut listener = ChildListener::new(store.clone(), budgets());

        let replay = listener.next().await.unwrap().unwrap();
        assert_eq!(replay.kind, ChildEventKind::Added);
        assert_eq!(replay.snapshot.key(), Some(key.as_str()));

        store.remove(&budgets().child(&key)).await.unwrap();
        let removed = listener.next().await.unwrap().unwrap();
        assert_eq!(removed.kind, ChildEventKind::Removed);
        assert_eq!(
            removed.snapshot.child("budgetAmount").as_str(),
            Some("10.00")
        );
    }

    #[tokio::test]
    async fn test_child_listener_diffs_parent_writes() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut listener = ChildListener::new(store.clone(), budgets());

        store
            .set(
                &StorePath::parse("users/u1"),
                json!({"budgets": {"a": {"budgetName": "A"}, "b": {"budgetName": "B"}}}),
            )
            .await
            .unwrap();
        store.remove(&StorePath::parse("users/u1")).await.unwrap();

        let kinds: Vec<_> = {
            let mut out = Vec::new();
            for _ in 0..4 {
                out.push(listener.next().await.unwrap().unwrap().kind);
            }
            out
        };
        assert_eq!(
            kinds,
            vec![
                ChildEventKind::Added,
                ChildEventKind::Added,
                ChildEventKind::Removed,
                ChildEventKind::Removed,
            ]
        );
    }
}

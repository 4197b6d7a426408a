//! Value and child listeners built on a store's change feed.
//!
//! Both listeners subscribe before their first read, so no write committed
//! after construction is missed. They live until dropped; dropping the
//! listener (or aborting the task that owns it) unsubscribes.

use log::warn;
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use super::tree::value_at;
use super::{ChildEvent, ChildEventKind, DocumentStore, Snapshot, StoreChange, StorePath};
use crate::errors::Result;

/// Continuous value listener: yields the current value first, then every
/// distinct value the node takes afterwards.
pub struct ValueListener {
    store: Arc<dyn DocumentStore>,
    path: StorePath,
    changes: broadcast::Receiver<StoreChange>,
    last: Option<Option<Value>>,
}

impl ValueListener {
    pub fn new(store: Arc<dyn DocumentStore>, path: StorePath) -> Self {
        let changes = store.subscribe();
        ValueListener {
            store,
            path,
            changes,
            last: None,
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Next value of the node. `None` once the store shuts down.
    pub async fn next(&mut self) -> Option<Result<Snapshot>> {
        if self.last.is_none() {
            return Some(self.refresh().await);
        }
        loop {
            let value = match self.changes.recv().await {
                // Write at or above the node carries the node's new value.
                Ok(change) => match self.path.relative_to(&change.path) {
                    Some(relative) => value_at(change.after.as_ref(), relative).cloned(),
                    None if change.path.starts_with(&self.path) => match self.read().await {
                        Ok(value) => value,
                        Err(e) => return Some(Err(e)),
                    },
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Value listener on {} lagged, {} changes dropped",
                        self.path, skipped
                    );
                    match self.read().await {
                        Ok(value) => value,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(RecvError::Closed) => return None,
            };
            if self.last.as_ref() != Some(&value) {
                self.last = Some(value.clone());
                return Some(Ok(Snapshot::new(self.path.clone(), value)));
            }
        }
    }

    async fn read(&self) -> Result<Option<Value>> {
        Ok(self.store.get(&self.path).await?.into_value())
    }

    async fn refresh(&mut self) -> Result<Snapshot> {
        let snapshot = self.store.get(&self.path).await?;
        self.last = Some(snapshot.value().cloned());
        Ok(snapshot)
    }
}

/// Child listener for a collection: replays existing children as `Added`,
/// then reports additions, changes and removals.
pub struct ChildListener {
    store: Arc<dyn DocumentStore>,
    path: StorePath,
    changes: broadcast::Receiver<StoreChange>,
    pending: VecDeque<ChildEvent>,
    primed: bool,
}

impl ChildListener {
    pub fn new(store: Arc<dyn DocumentStore>, path: StorePath) -> Self {
        let changes = store.subscribe();
        ChildListener {
            store,
            path,
            changes,
            pending: VecDeque::new(),
            primed: false,
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Next child event. `None` once the store shuts down.
    pub async fn next(&mut self) -> Option<Result<ChildEvent>> {
        if !self.primed {
            self.primed = true;
            match self.store.get(&self.path).await {
                Ok(snapshot) => self.pending.extend(snapshot.children().into_iter().map(
                    |child| ChildEvent {
                        kind: ChildEventKind::Added,
                        snapshot: child,
                    },
                )),
                Err(e) => return Some(Err(e)),
            }
        }

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            match self.changes.recv().await {
                Ok(change) => {
                    if let Err(e) = self.translate(change).await {
                        return Some(Err(e));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Child listener on {} lagged, {} changes dropped",
                        self.path, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn translate(&mut self, change: StoreChange) -> Result<()> {
        let depth = self.path.len();

        // Write at or above the collection: diff the collection's children.
        if let Some(relative) = self.path.relative_to(&change.path) {
            let before = value_at(change.before.as_ref(), relative);
            let after = value_at(change.after.as_ref(), relative);
            self.pending.extend(diff_children(&self.path, before, after));
            return Ok(());
        }

        if !change.path.starts_with(&self.path) {
            return Ok(());
        }

        // Write at a direct child.
        if change.path.len() == depth + 1 {
            let kind = match (&change.before, &change.after) {
                (None, Some(_)) => ChildEventKind::Added,
                (Some(_), None) => ChildEventKind::Removed,
                (Some(a), Some(b)) if a != b => ChildEventKind::Changed,
                _ => return Ok(()),
            };
            let value = match kind {
                ChildEventKind::Removed => change.before,
                _ => change.after,
            };
            self.pending.push_back(ChildEvent {
                kind,
                snapshot: Snapshot::new(change.path, value),
            });
            return Ok(());
        }

        // Write inside a child: report the child as a whole.
        let child_path = self.path.child(&change.path.segments()[depth]);
        let snapshot = self.store.get(&child_path).await?;
        let kind = if snapshot.exists() {
            ChildEventKind::Changed
        } else {
            ChildEventKind::Removed
        };
        self.pending.push_back(ChildEvent { kind, snapshot });
        Ok(())
    }
}

fn diff_children(
    collection: &StorePath,
    before: Option<&Value>,
    after: Option<&Value>,
) -> Vec<ChildEvent> {
    let before = before.and_then(Value::as_object);
    let after = after.and_then(Value::as_object);

    let keys: BTreeSet<&String> = before
        .into_iter()
        .flat_map(|m| m.keys())
        .chain(after.into_iter().flat_map(|m| m.keys()))
        .collect();

    keys.into_iter()
        .filter_map(|key| {
            let old = before.and_then(|m| m.get(key));
            let new = after.and_then(|m| m.get(key));
            let (kind, value) = match (old, new) {
                (None, Some(v)) => (ChildEventKind::Added, v),
                (Some(v), None) => (ChildEventKind::Removed, v),
                (Some(a), Some(b)) if a != b => (ChildEventKind::Changed, b),
                _ => return None,
            };
            Some(ChildEvent {
                kind,
                snapshot: Snapshot::new(collection.child(key), Some(value.clone())),
            })
        })
        .collect()
}

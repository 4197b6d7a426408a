use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Mutex;
use uuid::Uuid;

use super::StorePath;
use crate::errors::Result;

/// Immutable view of a node, as returned by reads and listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: StorePath,
    value: Option<Value>,
}

impl Snapshot {
    pub fn new(path: StorePath, value: Option<Value>) -> Self {
        Snapshot { path, value }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Last path segment; for collection children this is the push key.
    pub fn key(&self) -> Option<&str> {
        self.path.key()
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// String leaf, `None` when absent or not a string.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    pub fn child(&self, name: &str) -> Snapshot {
        let value = self
            .value
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|map| map.get(name))
            .cloned();
        Snapshot::new(self.path.child(name), value)
    }

    /// Direct children in key order. Scalars have no children.
    pub fn children(&self) -> Vec<Snapshot> {
        let Some(map) = self.value.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| Snapshot::new(self.path.child(key), map.get(key).cloned()))
            .collect()
    }

    /// Deserializes the node; `Ok(None)` when absent.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.value {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

/// A committed write, broadcast to listeners.
///
/// `before` and `after` are the subtree at `path` on either side of the write.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub path: StorePath,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEventKind {
    Added,
    Changed,
    Removed,
}

/// Child-level notification for a collection listener. For `Removed` the
/// snapshot holds the value the child had before removal.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEvent {
    pub kind: ChildEventKind,
    pub snapshot: Snapshot,
}

/// Update applied by [`DocumentStore::transaction`](super::DocumentStore::transaction).
/// Receives the current value and returns the replacement; `Value::Null` removes the node.
pub type TransactionFn = Box<dyn FnOnce(Option<Value>) -> Result<Value> + Send>;

static PUSH_CLOCK: Mutex<(i64, u32)> = Mutex::new((0, 0));

/// Time-ordered, lexicographically sortable key for collection appends.
///
/// Layout: 12 hex digits of epoch millis, a 6 digit sequence within the
/// millisecond, then 8 random hex digits. Keys never go backwards within a
/// process, even if the wall clock does.
pub fn generate_push_key() -> String {
    let now = Utc::now().timestamp_millis();
    let (millis, seq) = {
        let mut clock = PUSH_CLOCK.lock().unwrap_or_else(|e| e.into_inner());
        if now > clock.0 {
            *clock = (now, 0);
        } else {
            clock.1 += 1;
        }
        *clock
    };
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{:012x}{:06x}{}", millis, seq, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_children_are_key_ordered() {
        let snapshot = Snapshot::new(
            StorePath::parse("users/u1/budgets"),
            Some(json!({"b": {"n": 2}, "a": {"n": 1}})),
        );
        let keys: Vec<_> = snapshot
            .children()
            .iter()
            .map(|c| c.key().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(snapshot.child("a").child("n").value(), Some(&json!(1)));
        assert!(!snapshot.child("c").exists());
    }

    #[test]
    fn test_push_keys_sort_in_creation_order() {
        let keys: Vec<String> = (0..50).map(|_| generate_push_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}

//! Last-value-wins notification channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Holds the most recent value published and wakes every subscriber on
/// change. Subscribers that fall behind only see the latest value.
///
/// Publishing never blocks and never fails, with or without subscribers.
#[derive(Debug)]
pub struct ObservableSlot<T> {
    sender: watch::Sender<Option<T>>,
}

impl<T: Clone> Default for ObservableSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ObservableSlot<T> {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        ObservableSlot { sender }
    }

    pub fn publish(&self, value: T) {
        self.sender.send_replace(Some(value));
    }

    /// Latest published value, `None` before the first publish.
    pub fn latest(&self) -> Option<T> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Outcome of an append, as published to observers.
///
/// `Failed` is the "operation failed" signal; it never means "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum AddResult<T> {
    Added(T),
    Failed,
}

impl<T> AddResult<T> {
    pub fn is_added(&self) -> bool {
        matches!(self, AddResult::Added(_))
    }

    pub fn added(self) -> Option<T> {
        match self {
            AddResult::Added(record) => Some(record),
            AddResult::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_observers_keeps_latest() {
        let slot = ObservableSlot::new();
        assert_eq!(slot.latest(), None);
        slot.publish(1);
        slot.publish(2);
        assert_eq!(slot.latest(), Some(2));
        assert_eq!(slot.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_sees_last_value_only() {
        let slot = ObservableSlot::new();
        let mut rx = slot.subscribe();
        slot.publish("a".to_string());
        slot.publish("b".to_string());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().clone(), Some("b".to_string()));
    }

    #[test]
    fn test_add_result_serialization() {
        let added = serde_json::to_value(AddResult::Added(5)).unwrap();
        assert_eq!(added, serde_json::json!({"status": "added", "record": 5}));
        let failed = serde_json::to_value(AddResult::<i32>::Failed).unwrap();
        assert_eq!(failed, serde_json::json!({"status": "failed"}));
    }
}

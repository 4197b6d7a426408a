//! Notification sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::UserNotification;

/// Receives every notification the hub publishes, after the user's slots
/// have been updated.
///
/// `emit()` must be fast and non-blocking. Failure to deliver must not affect
/// the operation that produced the notification.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, notification: UserNotification);

    fn emit_batch(&self, notifications: Vec<UserNotification>) {
        for notification in notifications {
            self.emit(notification);
        }
    }
}

/// Discards everything. Used when nothing outside the process observes.
#[derive(Clone, Default)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn emit(&self, _notification: UserNotification) {}
}

/// Mock sink for testing - collects emitted notifications.
#[derive(Clone, Default)]
pub struct MockNotificationSink {
    notifications: Arc<Mutex<Vec<UserNotification>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<UserNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().unwrap().is_empty()
    }
}

impl NotificationSink for MockNotificationSink {
    fn emit(&self, notification: UserNotification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Notification;
    use crate::session::UserId;

    fn loaded(user: &str) -> UserNotification {
        UserNotification {
            user_id: UserId::new(user).unwrap(),
            notification: Notification::BudgetsLoaded { budgets: vec![] },
        }
    }

    #[test]
    fn test_noop_sink_does_not_panic() {
        let sink = NoOpNotificationSink;
        sink.emit(loaded("u1"));
        sink.emit_batch(vec![loaded("u1"), loaded("u2")]);
    }

    #[test]
    fn test_mock_sink_collects_notifications() {
        let sink = MockNotificationSink::new();
        assert!(sink.is_empty());

        sink.emit(loaded("u1"));
        sink.emit_batch(vec![loaded("u2"), loaded("u3")]);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.notifications()[1].user_id.as_str(), "u2");

        sink.clear();
        assert!(sink.is_empty());
    }
}

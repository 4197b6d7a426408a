use budgetbook_core::notifications::{Notification, NotificationSink, UserNotification};
use budgetbook_core::UserId;
use serde_json::Value;
use tokio::sync::broadcast;

/// Canonical event names sent over the SSE stream.
pub const BUDGETS_LOADED: &str = "budgets:loaded";
pub const BUDGET_ADDED: &str = "budgets:added";
pub const TRANSACTIONS_LOADED: &str = "transactions:loaded";
pub const TRANSACTION_ADDED: &str = "transactions:added";
pub const CATEGORY_BUDGETS_LOADED: &str = "categories:loaded";
pub const AGGREGATE_CHANGED: &str = "aggregate:changed";

/// Envelope carrying the event name, its addressee and the payload.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub user_id: UserId,
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn with_payload(user_id: UserId, name: &'static str, payload: Value) -> Self {
        Self {
            user_id,
            name,
            payload: Some(payload),
        }
    }
}

pub fn event_name(notification: &Notification) -> &'static str {
    match notification {
        Notification::BudgetsLoaded { .. } => BUDGETS_LOADED,
        Notification::BudgetAdded { .. } => BUDGET_ADDED,
        Notification::TransactionsLoaded { .. } => TRANSACTIONS_LOADED,
        Notification::TransactionAdded { .. } => TRANSACTION_ADDED,
        Notification::CategoryBudgetsLoaded { .. } => CATEGORY_BUDGETS_LOADED,
        Notification::AggregateChanged { .. } => AGGREGATE_CHANGED,
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

impl NotificationSink for EventBus {
    fn emit(&self, notification: UserNotification) {
        let name = event_name(&notification.notification);
        match serde_json::to_value(&notification.notification) {
            Ok(payload) => self.publish(ServerEvent::with_payload(
                notification.user_id,
                name,
                payload,
            )),
            Err(err) => tracing::error!("Failed to serialize {} event: {}", name, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetbook_core::aggregates::AggregateKind;

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(UserNotification {
            user_id: UserId::new("u1").unwrap(),
            notification: Notification::AggregateChanged {
                kind: AggregateKind::TotalBudget,
                total: Some("25.00".to_string()),
            },
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, AGGREGATE_CHANGED);
        assert_eq!(event.user_id.as_str(), "u1");
        assert_eq!(event.payload.unwrap()["total"], "25.00");
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(8);
        bus.emit(UserNotification {
            user_id: UserId::new("u1").unwrap(),
            notification: Notification::BudgetsLoaded { budgets: vec![] },
        });
    }
}

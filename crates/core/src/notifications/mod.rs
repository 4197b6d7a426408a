//! Fan-out of service results to observers.

mod notification;
mod notification_hub;
mod notification_sink;
mod observable_slot;

pub use notification::{Notification, UserNotification};
pub use notification_hub::{NotificationHub, UserSlots};
pub use notification_sink::{MockNotificationSink, NoOpNotificationSink, NotificationSink};
pub use observable_slot::{AddResult, ObservableSlot};

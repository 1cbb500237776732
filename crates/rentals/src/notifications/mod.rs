//! Per-user notification log fed by the reservation lifecycle and messaging.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{NewNotification, Notification, NotificationFeed, NotificationId, NotificationKind};
pub use router::notification_router;
pub use service::{emit, NotificationCenter};

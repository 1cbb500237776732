use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::UserId;
use crate::reservations::ReservationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReservationApproved,
    ReservationDenied,
    ReservationCancelled,
    NewMessage,
    NewReservation,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ReservationApproved => "Reservation Approved",
            NotificationKind::ReservationDenied => "Reservation Denied",
            NotificationKind::ReservationCancelled => "Reservation Cancelled",
            NotificationKind::NewMessage => "New Message Received",
            NotificationKind::NewReservation => "New Reservation Request",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user: UserId,
    #[serde(rename = "notification_type")]
    pub kind: NotificationKind,
    pub reservation: Option<ReservationId>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Unread entry appended to a user's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user: UserId,
    pub kind: NotificationKind,
    pub reservation: Option<ReservationId>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn new(
        user: UserId,
        kind: NotificationKind,
        reservation: Option<ReservationId>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user,
            kind,
            reservation,
            message: message.into(),
            created_at,
        }
    }
}

/// A user's notification log with its unread tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

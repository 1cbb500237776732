use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::UserId;
use crate::apartments::ApartmentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Denied,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Denied => "denied",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Denied | ReservationStatus::Cancelled | ReservationStatus::Completed
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status-changing commands applied to an existing reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Deny,
    Cancel,
    Complete,
}

impl Transition {
    pub const fn verb(self) -> &'static str {
        match self {
            Transition::Approve => "approved",
            Transition::Deny => "denied",
            Transition::Cancel => "cancelled",
            Transition::Complete => "completed",
        }
    }
}

/// How strictly the reservation state machine is enforced.
///
/// `Strict` follows `pending -> {approved, denied, cancelled}` and
/// `approved -> {cancelled, completed}`. `Legacy` additionally lets approve and cancel
/// run from any state, re-stamping the reviewer and re-notifying the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    #[default]
    Strict,
    Legacy,
}

impl TransitionPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "legacy" | "permissive" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn permits(self, from: ReservationStatus, transition: Transition) -> bool {
        use ReservationStatus::*;

        match (self, transition) {
            (_, Transition::Deny) => from == Pending,
            (_, Transition::Complete) => from == Approved,
            (TransitionPolicy::Legacy, Transition::Approve | Transition::Cancel) => true,
            (TransitionPolicy::Strict, Transition::Approve) => from == Pending,
            (TransitionPolicy::Strict, Transition::Cancel) => matches!(from, Pending | Approved),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub tenant: UserId,
    pub apartment: ApartmentId,
    pub move_in: NaiveDate,
    pub total_price: Option<u32>,
    pub status: ReservationStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: String,
    pub special_requests: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub(crate) fn stamp_review(
        &mut self,
        status: ReservationStatus,
        reviewer: UserId,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }
}

/// Reservation row handed to the store; the id is allocated on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub tenant: UserId,
    pub apartment: ApartmentId,
    pub move_in: NaiveDate,
    pub total_price: Option<u32>,
    pub status: ReservationStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub special_requests: String,
    pub created_at: DateTime<Utc>,
}

/// Move-in request submitted by a tenant (or by staff on their behalf).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub apartment: ApartmentId,
    pub move_in: NaiveDate,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub auto_approve: bool,
}

/// Editable reservation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationChanges {
    pub apartment: ApartmentId,
    pub move_in: NaiveDate,
    #[serde(default)]
    pub special_requests: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationScope {
    All,
    Mine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationQuery {
    #[serde(default, rename = "view")]
    pub scope: Option<ReservationScope>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
}

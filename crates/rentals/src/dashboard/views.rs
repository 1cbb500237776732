use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::accounts::UserId;
use crate::apartments::{Apartment, ApartmentId};
use crate::reservations::{Reservation, ReservationId, ReservationStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationSummary {
    pub id: ReservationId,
    pub tenant: UserId,
    pub apartment: ApartmentId,
    pub unit_number: String,
    pub move_in: NaiveDate,
    pub status: ReservationStatus,
    pub status_label: &'static str,
    pub created_at: DateTime<Utc>,
}

impl ReservationSummary {
    pub(crate) fn new(reservation: &Reservation, unit_number: String) -> Self {
        Self {
            id: reservation.id,
            tenant: reservation.tenant,
            apartment: reservation.apartment,
            unit_number,
            move_in: reservation.move_in,
            status: reservation.status,
            status_label: reservation.status.label(),
            created_at: reservation.created_at,
        }
    }
}

/// Landing page figures. Reservation counts are global for staff and personal for tenants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_apartments: usize,
    pub available_apartments: usize,
    pub unread_notifications: usize,
    pub pending_reservations: usize,
    pub approved_reservations: usize,
    pub recent_reservations: Vec<ReservationSummary>,
    pub available_listings: Vec<Apartment>,
    pub awaiting_review: Vec<ReservationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub pending_reservations: Vec<ReservationSummary>,
    pub total_tenants: usize,
    pub total_reservations: usize,
    pub approved_today: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MyApartment {
    Residing {
        reservation: Reservation,
        apartment: Apartment,
        days_since_move_in: i64,
        months_stayed: i64,
    },
    Waiting {
        pending: Vec<ReservationSummary>,
    },
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::views::{AdminOverview, MyApartment, Overview, ReservationSummary};
use crate::access::{authorize, Actor, Capability};
use crate::apartments::{Apartment, ApartmentId};
use crate::error::ServiceError;
use crate::reservations::{Reservation, ReservationStatus};
use crate::store::{RentalStore, StoreTransaction};

const RECENT_RESERVATIONS: usize = 5;
const AVAILABLE_LISTINGS: usize = 6;
const REVIEW_QUEUE: usize = 5;

pub struct Dashboard<S> {
    store: Arc<S>,
}

impl<S> Dashboard<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn overview(&self, actor: &Actor) -> Result<Overview, ServiceError> {
        self.store.read(|tx| {
            let apartments = tx.apartments()?;
            let units = unit_numbers(&apartments);
            let staff = actor.can(Capability::ViewAllReservations);
            let visible: Vec<Reservation> = tx
                .reservations()?
                .into_iter()
                .filter(|reservation| staff || reservation.tenant == actor.user_id)
                .collect();
            let unread_notifications = tx
                .notifications_for(actor.user_id)?
                .iter()
                .filter(|notification| !notification.is_read)
                .count();

            let awaiting_review = if staff {
                visible
                    .iter()
                    .filter(|reservation| reservation.status == ReservationStatus::Pending)
                    .take(REVIEW_QUEUE)
                    .map(|reservation| summarize(reservation, &units))
                    .collect()
            } else {
                Vec::new()
            };

            Ok(Overview {
                total_apartments: apartments.len(),
                available_apartments: apartments.iter().filter(|a| a.is_available()).count(),
                unread_notifications,
                pending_reservations: count_status(&visible, ReservationStatus::Pending),
                approved_reservations: count_status(&visible, ReservationStatus::Approved),
                recent_reservations: visible
                    .iter()
                    .take(RECENT_RESERVATIONS)
                    .map(|reservation| summarize(reservation, &units))
                    .collect(),
                available_listings: apartments
                    .iter()
                    .filter(|apartment| apartment.is_available())
                    .take(AVAILABLE_LISTINGS)
                    .cloned()
                    .collect(),
                awaiting_review,
            })
        })
    }

    /// Staff-only review queue and headline counts for `today`.
    pub fn admin_overview(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<AdminOverview, ServiceError> {
        authorize(actor, Capability::ViewAdminDashboard)?;

        self.store.read(|tx| {
            let units = unit_numbers(&tx.apartments()?);
            let reservations = tx.reservations()?;
            let total_tenants = tx.users()?.iter().filter(|user| !user.is_staff).count();
            let approved_today = reservations
                .iter()
                .filter(|reservation| reservation.status == ReservationStatus::Approved)
                .filter(|reservation| {
                    reservation
                        .reviewed_at
                        .is_some_and(|reviewed| reviewed.date_naive() == today)
                })
                .count();

            Ok(AdminOverview {
                pending_reservations: reservations
                    .iter()
                    .filter(|reservation| reservation.status == ReservationStatus::Pending)
                    .map(|reservation| summarize(reservation, &units))
                    .collect(),
                total_tenants,
                total_reservations: reservations.len(),
                approved_today,
            })
        })
    }

    /// The actor's current home, or their outstanding requests when they have none yet.
    pub fn my_apartment(&self, actor: &Actor, today: NaiveDate) -> Result<MyApartment, ServiceError> {
        self.store.read(|tx| {
            let own: Vec<Reservation> = tx
                .reservations()?
                .into_iter()
                .filter(|reservation| reservation.tenant == actor.user_id)
                .collect();

            if let Some(reservation) = own
                .iter()
                .find(|reservation| reservation.status == ReservationStatus::Approved)
            {
                let apartment = load_apartment(tx, reservation.apartment)?;
                let days_since_move_in = (today - reservation.move_in).num_days();
                return Ok(MyApartment::Residing {
                    reservation: reservation.clone(),
                    apartment,
                    days_since_move_in,
                    months_stayed: days_since_move_in.div_euclid(30),
                });
            }

            let units = unit_numbers(&tx.apartments()?);
            Ok(MyApartment::Waiting {
                pending: own
                    .iter()
                    .filter(|reservation| reservation.status == ReservationStatus::Pending)
                    .map(|reservation| summarize(reservation, &units))
                    .collect(),
            })
        })
    }
}

fn unit_numbers(apartments: &[Apartment]) -> HashMap<ApartmentId, String> {
    apartments
        .iter()
        .map(|apartment| (apartment.id, apartment.unit_number.clone()))
        .collect()
}

fn summarize(reservation: &Reservation, units: &HashMap<ApartmentId, String>) -> ReservationSummary {
    let unit_number = units
        .get(&reservation.apartment)
        .cloned()
        .unwrap_or_default();
    ReservationSummary::new(reservation, unit_number)
}

fn count_status(reservations: &[Reservation], status: ReservationStatus) -> usize {
    reservations
        .iter()
        .filter(|reservation| reservation.status == status)
        .count()
}

fn load_apartment(
    tx: &dyn StoreTransaction,
    id: ApartmentId,
) -> Result<Apartment, ServiceError> {
    tx.apartment(id)?
        .ok_or_else(|| ServiceError::not_found(format!("apartment {id} not found")))
}

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    NewReservation, Reservation, ReservationChanges, ReservationId, ReservationQuery,
    ReservationRequest, ReservationScope, ReservationStatus, Transition, TransitionPolicy,
};
use crate::access::{authorize, Actor, Capability};
use crate::apartments::{Apartment, ApartmentId, ApartmentStatus};
use crate::error::ServiceError;
use crate::notifications::{emit, NewNotification, NotificationKind};
use crate::store::{RentalStore, StoreTransaction};

/// Reservation state machine. The only writer allowed to mark an apartment occupied.
pub struct ReservationLifecycle<S> {
    store: Arc<S>,
    policy: TransitionPolicy,
}

impl<S> ReservationLifecycle<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Files a move-in request for the actor.
    ///
    /// Availability is re-checked inside the same transaction as the insert. Staff may ask for
    /// immediate approval; the flag is ignored for tenants and the request stays pending.
    pub fn create(
        &self,
        actor: &Actor,
        request: ReservationRequest,
    ) -> Result<Reservation, ServiceError> {
        let auto_approve = request.auto_approve && actor.can(Capability::AutoApprove);
        if request.auto_approve && !auto_approve {
            warn!(actor = %actor.username, "auto-approve ignored for non-staff actor");
        }

        let reservation = self.store.transaction(|tx| {
            let mut apartment = load_apartment(tx, request.apartment)?;
            if !apartment.is_available() {
                return Err(ServiceError::validation(format!(
                    "Unit {} is no longer available. Current status: {}",
                    apartment.unit_number,
                    apartment.status.label()
                )));
            }

            let now = Utc::now();
            let (status, reviewed_by, reviewed_at) = if auto_approve {
                (ReservationStatus::Approved, Some(actor.user_id), Some(now))
            } else {
                (ReservationStatus::Pending, None, None)
            };

            let reservation = tx.insert_reservation(NewReservation {
                tenant: actor.user_id,
                apartment: apartment.id,
                move_in: request.move_in,
                total_price: Some(apartment.price_per_month),
                status,
                reviewed_by,
                reviewed_at,
                special_requests: request.special_requests.trim().to_string(),
                created_at: now,
            })?;

            if auto_approve {
                occupy(tx, &mut apartment)?;
            } else {
                let message = format!(
                    "New reservation request from {} for Unit {}",
                    actor.username, apartment.unit_number
                );
                for staff in tx.users()?.into_iter().filter(|user| user.is_staff) {
                    emit(
                        tx,
                        NewNotification::new(
                            staff.id,
                            NotificationKind::NewReservation,
                            Some(reservation.id),
                            message.clone(),
                            now,
                        ),
                    )?;
                }
            }

            Ok(reservation)
        })?;

        info!(
            reservation = %reservation.id,
            apartment = %reservation.apartment,
            tenant = %actor.username,
            status = %reservation.status,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Approves a request and occupies its apartment in one transaction.
    pub fn approve(&self, actor: &Actor, id: ReservationId) -> Result<Reservation, ServiceError> {
        authorize(actor, Capability::ReviewReservations)?;

        let reservation = self.store.transaction(|tx| {
            let mut reservation = load(tx, id)?;
            self.ensure_permitted(&reservation, Transition::Approve)?;
            let mut apartment = load_apartment(tx, reservation.apartment)?;

            if self.policy == TransitionPolicy::Strict {
                let double_booked = tx.reservations()?.into_iter().any(|other| {
                    other.id != reservation.id
                        && other.apartment == reservation.apartment
                        && other.status == ReservationStatus::Approved
                });
                if double_booked {
                    return Err(ServiceError::validation(format!(
                        "Unit {} already has an approved reservation.",
                        apartment.unit_number
                    )));
                }
            }

            let now = Utc::now();
            reservation.stamp_review(ReservationStatus::Approved, actor.user_id, now);
            tx.save_reservation(reservation.clone())?;
            occupy(tx, &mut apartment)?;

            emit(
                tx,
                NewNotification::new(
                    reservation.tenant,
                    NotificationKind::ReservationApproved,
                    Some(reservation.id),
                    format!(
                        "Your move-in request for Unit {} has been approved!",
                        apartment.unit_number
                    ),
                    now,
                ),
            )?;
            Ok(reservation)
        })?;

        info!(reservation = %reservation.id, reviewer = %actor.username, "reservation approved");
        Ok(reservation)
    }

    /// Rejects a pending request. A blank reason fails before anything is written.
    pub fn deny(
        &self,
        actor: &Actor,
        id: ReservationId,
        reason: &str,
    ) -> Result<Reservation, ServiceError> {
        authorize(actor, Capability::ReviewReservations)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::validation(
                "Please provide a reason for denial.",
            ));
        }

        let reservation = self.store.transaction(|tx| {
            let mut reservation = load(tx, id)?;
            if !self.policy.permits(reservation.status, Transition::Deny) {
                return Err(ServiceError::validation(
                    "This reservation cannot be denied.",
                ));
            }
            let apartment = load_apartment(tx, reservation.apartment)?;

            let now = Utc::now();
            reservation.stamp_review(ReservationStatus::Denied, actor.user_id, now);
            reservation.admin_notes = reason.to_string();
            tx.save_reservation(reservation.clone())?;

            emit(
                tx,
                NewNotification::new(
                    reservation.tenant,
                    NotificationKind::ReservationDenied,
                    Some(reservation.id),
                    format!(
                        "Your reservation for {} has been denied. Reason: {}",
                        apartment.name, reason
                    ),
                    now,
                ),
            )?;
            Ok(reservation)
        })?;

        info!(reservation = %reservation.id, reviewer = %actor.username, "reservation denied");
        Ok(reservation)
    }

    /// Cancels on behalf of the owner or staff. Apartment status is left alone.
    pub fn cancel(&self, actor: &Actor, id: ReservationId) -> Result<Reservation, ServiceError> {
        let reservation = self.store.transaction(|tx| {
            let mut reservation = load(tx, id)?;
            authorize(
                actor,
                Capability::CancelReservation {
                    owner: reservation.tenant,
                },
            )?;
            self.ensure_permitted(&reservation, Transition::Cancel)?;

            let now = Utc::now();
            reservation.status = ReservationStatus::Cancelled;
            reservation.updated_at = now;
            tx.save_reservation(reservation.clone())?;

            if actor.is_staff() && actor.user_id != reservation.tenant {
                let apartment = load_apartment(tx, reservation.apartment)?;
                emit(
                    tx,
                    NewNotification::new(
                        reservation.tenant,
                        NotificationKind::ReservationCancelled,
                        Some(reservation.id),
                        format!(
                            "Your reservation for {} has been cancelled by admin.",
                            apartment.name
                        ),
                        now,
                    ),
                )?;
            }
            Ok::<_, ServiceError>(reservation)
        })?;

        info!(reservation = %reservation.id, actor = %actor.username, "reservation cancelled");
        Ok(reservation)
    }

    /// Records move-out. Staff release the unit through the apartment registry.
    pub fn complete(&self, actor: &Actor, id: ReservationId) -> Result<Reservation, ServiceError> {
        authorize(actor, Capability::ReviewReservations)?;

        let reservation = self.store.transaction(|tx| {
            let mut reservation = load(tx, id)?;
            self.ensure_permitted(&reservation, Transition::Complete)?;
            reservation.status = ReservationStatus::Completed;
            reservation.updated_at = Utc::now();
            tx.save_reservation(reservation.clone())?;
            Ok::<_, ServiceError>(reservation)
        })?;

        info!(reservation = %reservation.id, actor = %actor.username, "reservation completed");
        Ok(reservation)
    }

    /// Edits request details without re-checking availability. An approved reservation keeps
    /// its unit; it has to be cancelled or completed before it can move.
    pub fn update(
        &self,
        actor: &Actor,
        id: ReservationId,
        changes: ReservationChanges,
    ) -> Result<Reservation, ServiceError> {
        let reservation = self.store.transaction(|tx| {
            let mut reservation = load(tx, id)?;
            authorize(
                actor,
                Capability::ModifyReservation {
                    owner: reservation.tenant,
                    status: reservation.status,
                },
            )?;
            if changes.apartment != reservation.apartment {
                if reservation.status == ReservationStatus::Approved {
                    return Err(ServiceError::validation(
                        "Cancel or complete the approved reservation before moving it.",
                    ));
                }
                load_apartment(tx, changes.apartment)?;
            }

            reservation.apartment = changes.apartment;
            reservation.move_in = changes.move_in;
            reservation.special_requests = changes.special_requests.trim().to_string();
            reservation.updated_at = Utc::now();
            tx.save_reservation(reservation.clone())?;
            Ok::<_, ServiceError>(reservation)
        })?;

        info!(reservation = %reservation.id, actor = %actor.username, "reservation updated");
        Ok(reservation)
    }

    /// Reservations the actor may not view are reported as missing.
    pub fn get(&self, actor: &Actor, id: ReservationId) -> Result<Reservation, ServiceError> {
        let reservation = self.store.read(|tx| load(tx, id))?;
        if !actor.can(Capability::ViewReservation {
            owner: reservation.tenant,
        }) {
            return Err(not_found(id));
        }
        Ok(reservation)
    }

    /// Staff see every reservation unless they ask for their own; tenants only see theirs.
    pub fn list(
        &self,
        actor: &Actor,
        query: &ReservationQuery,
    ) -> Result<Vec<Reservation>, ServiceError> {
        let scope = if actor.can(Capability::ViewAllReservations) {
            query.scope.unwrap_or(ReservationScope::All)
        } else {
            ReservationScope::Mine
        };

        let reservations = self.store.read(|tx| tx.reservations())?;
        Ok(reservations
            .into_iter()
            .filter(|reservation| {
                scope == ReservationScope::All || reservation.tenant == actor.user_id
            })
            .filter(|reservation| {
                query
                    .status
                    .map_or(true, |status| reservation.status == status)
            })
            .collect())
    }

    fn ensure_permitted(
        &self,
        reservation: &Reservation,
        transition: Transition,
    ) -> Result<(), ServiceError> {
        if self.policy.permits(reservation.status, transition) {
            return Ok(());
        }
        warn!(
            reservation = %reservation.id,
            status = %reservation.status,
            transition = ?transition,
            "transition rejected"
        );
        Err(ServiceError::validation(format!(
            "A {} reservation cannot be {}.",
            reservation.status,
            transition.verb()
        )))
    }
}

fn not_found(id: ReservationId) -> ServiceError {
    ServiceError::not_found(format!("reservation {id} not found"))
}

fn load(tx: &dyn StoreTransaction, id: ReservationId) -> Result<Reservation, ServiceError> {
    tx.reservation(id)?.ok_or_else(|| not_found(id))
}

fn load_apartment(
    tx: &mut dyn StoreTransaction,
    id: ApartmentId,
) -> Result<Apartment, ServiceError> {
    tx.apartment(id)?
        .ok_or_else(|| ServiceError::not_found(format!("apartment {id} not found")))
}

fn occupy(tx: &mut dyn StoreTransaction, apartment: &mut Apartment) -> Result<(), ServiceError> {
    apartment.status = ApartmentStatus::Occupied;
    apartment.updated_at = Utc::now();
    tx.save_apartment(apartment.clone())?;
    Ok(())
}

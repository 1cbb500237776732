use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Apartment, ApartmentDraft, ApartmentFilter, ApartmentId, ApartmentStatus};
use super::fixture::{ApartmentFixture, ImportSummary};
use crate::access::{authorize, Actor, Capability};
use crate::error::ServiceError;
use crate::reservations::ReservationStatus;
use crate::store::{RentalStore, StoreTransaction};

/// Staff-maintained catalogue of units. Never marks a unit occupied on its own.
pub struct ApartmentRegistry<S> {
    store: Arc<S>,
}

impl<S> ApartmentRegistry<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self, filter: &ApartmentFilter) -> Result<Vec<Apartment>, ServiceError> {
        let apartments = self.store.read(|tx| tx.apartments())?;
        Ok(apartments
            .into_iter()
            .filter(|apartment| filter.matches(apartment))
            .collect())
    }

    pub fn get(&self, id: ApartmentId) -> Result<Apartment, ServiceError> {
        self.store.read(|tx| load(tx, id))
    }

    pub fn create(&self, actor: &Actor, draft: ApartmentDraft) -> Result<Apartment, ServiceError> {
        authorize(actor, Capability::ManageApartments)?;
        draft.validate_new()?;
        let draft = draft.normalized();

        let apartment = self
            .store
            .transaction(|tx| tx.insert_apartment(draft, Utc::now()))?;
        info!(apartment = %apartment.unit_number, actor = %actor.username, "apartment created");
        Ok(apartment)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: ApartmentId,
        draft: ApartmentDraft,
    ) -> Result<Apartment, ServiceError> {
        authorize(actor, Capability::ManageApartments)?;
        draft.validate()?;
        let draft = draft.normalized();

        let apartment = self.store.transaction(|tx| {
            let mut apartment = load(tx, id)?;
            check_status_change(tx, &apartment, draft.status)?;
            apartment.apply(draft, Utc::now());
            tx.save_apartment(apartment.clone())?;
            Ok::<_, ServiceError>(apartment)
        })?;

        info!(apartment = %apartment.unit_number, actor = %actor.username, status = ?apartment.status, "apartment updated");
        Ok(apartment)
    }

    /// Removes a unit together with its reservations.
    pub fn delete(&self, actor: &Actor, id: ApartmentId) -> Result<(), ServiceError> {
        authorize(actor, Capability::ManageApartments)?;
        self.store.transaction(|tx| {
            load(tx, id)?;
            tx.delete_apartment(id)?;
            Ok::<_, ServiceError>(())
        })?;
        info!(apartment_id = %id, actor = %actor.username, "apartment deleted");
        Ok(())
    }

    /// Seeds units from a fixture in one transaction, skipping units that already exist.
    pub fn import(&self, fixture: ApartmentFixture) -> Result<ImportSummary, ServiceError> {
        let summary = self.store.transaction(|tx| {
            let now = Utc::now();
            let mut summary = ImportSummary::default();
            for draft in fixture.into_drafts() {
                if tx.apartment_by_unit(&draft.unit_number)?.is_some() {
                    summary.skipped += 1;
                    continue;
                }
                tx.insert_apartment(draft, now)?;
                summary.imported += 1;
            }
            Ok::<_, ServiceError>(summary)
        })?;

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "apartment fixture imported"
        );
        Ok(summary)
    }
}

fn load(tx: &dyn StoreTransaction, id: ApartmentId) -> Result<Apartment, ServiceError> {
    tx.apartment(id)?
        .ok_or_else(|| ServiceError::not_found(format!("apartment {id} not found")))
}

/// Occupancy is owned by the reservation lifecycle: forms may neither set it nor clear it
/// while an approved reservation still holds the unit.
fn check_status_change(
    tx: &mut dyn StoreTransaction,
    current: &Apartment,
    requested: ApartmentStatus,
) -> Result<(), ServiceError> {
    if requested == current.status {
        return Ok(());
    }

    if requested == ApartmentStatus::Occupied {
        return Err(ServiceError::validation(
            "occupancy is recorded by approving a reservation",
        ));
    }

    if current.status == ApartmentStatus::Occupied {
        let held = tx.reservations()?.into_iter().any(|reservation| {
            reservation.apartment == current.id && reservation.status == ReservationStatus::Approved
        });
        if held {
            warn!(apartment = %current.unit_number, "refused to release unit with approved reservation");
            return Err(ServiceError::validation(format!(
                "Unit {} has an approved reservation; complete or cancel it first.",
                current.unit_number
            )));
        }
    }

    Ok(())
}

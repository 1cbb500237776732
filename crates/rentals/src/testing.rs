use std::sync::Arc;

use chrono::Utc;

use crate::access::Actor;
use crate::accounts::{NewAccount, TenantRegistration, UserAccount};
use crate::apartments::{ApartmentDraft, ApartmentStatus, ApartmentType};
use crate::reservations::TransitionPolicy;
use crate::store::{MemoryStore, RentalStore, RepositoryError};
use crate::Rentals;

pub(crate) struct Fixture {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) rentals: Rentals<MemoryStore>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_policy(TransitionPolicy::Strict)
    }

    pub(crate) fn with_policy(policy: TransitionPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let rentals = Rentals::new(Arc::clone(&store), policy);
        Self { store, rentals }
    }
}

pub(crate) fn seed_user(store: &MemoryStore, username: &str, is_staff: bool) -> UserAccount {
    store
        .transaction::<_, RepositoryError, _>(|tx| {
            tx.insert_user(NewAccount {
                username: username.to_string(),
                full_name: format!("{username} test"),
                email: format!("{username}@example.com"),
                is_staff,
                joined_at: Utc::now(),
            })
        })
        .expect("seed user")
}

pub(crate) fn actor_for(account: &UserAccount) -> Actor {
    Actor::from_account(account)
}

pub(crate) fn registration(username: &str, id_number: &str) -> TenantRegistration {
    TenantRegistration {
        username: username.to_string(),
        full_name: format!("{username} tenant"),
        email: format!("{username}@example.com"),
        phone: "0917 555 0100".to_string(),
        address: "12 Mabini St".to_string(),
        emergency_contact: "Kin".to_string(),
        emergency_phone: "0917 555 0199".to_string(),
        id_number: id_number.to_string(),
    }
}

pub(crate) fn apartment_draft(unit_number: &str, price_per_month: u32) -> ApartmentDraft {
    ApartmentDraft {
        name: "Azure Residences".to_string(),
        apartment_type: ApartmentType::Studio,
        floor: 1,
        unit_number: unit_number.to_string(),
        price_per_month,
        size_sqm: 28.5,
        bedrooms: 0,
        bathrooms: 1,
        status: ApartmentStatus::Available,
        description: String::new(),
        amenities: String::new(),
        image: None,
    }
}

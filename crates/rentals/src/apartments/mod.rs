//! Apartment registry: listings, staff maintenance and fixture seeding.

pub mod domain;
pub mod fixture;
pub mod router;
pub mod service;

pub use domain::{
    Apartment, ApartmentDraft, ApartmentFilter, ApartmentId, ApartmentStatus, ApartmentType,
};
pub use fixture::{ApartmentFixture, FixtureError, ImportSummary};
pub use router::apartment_router;
pub use service::ApartmentRegistry;

//! Reservation lifecycle: requests, reviews and the occupancy they drive.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DenialRequest, NewReservation, Reservation, ReservationChanges, ReservationId,
    ReservationQuery, ReservationRequest, ReservationScope, ReservationStatus, Transition,
    TransitionPolicy,
};
pub use router::reservation_router;
pub use service::ReservationLifecycle;

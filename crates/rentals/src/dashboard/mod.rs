//! Read models for the landing, admin and "my apartment" pages.

pub mod router;
pub mod service;
pub mod views;

pub use router::dashboard_router;
pub use service::Dashboard;
pub use views::{AdminOverview, MyApartment, Overview, ReservationSummary};

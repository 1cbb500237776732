pub mod access;
pub mod accounts;
pub mod apartments;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod messaging;
pub mod notifications;
pub mod reservations;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use app::Rentals;
pub use error::{AppError, ServiceError};

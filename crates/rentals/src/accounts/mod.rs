//! Tenant sign-up, staff provisioning and actor resolution.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    NewAccount, RegisteredTenant, TenantProfile, TenantRegistration, UserAccount, UserId,
};
pub use router::{directory_router, registration_router};
pub use service::AccountDirectory;

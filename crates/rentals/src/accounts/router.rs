use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use super::domain::{RegisteredTenant, TenantRegistration, UserAccount};
use super::service::AccountDirectory;
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

/// Public sign-up endpoint; mounted outside the actor middleware.
pub fn registration_router<S>(directory: Arc<AccountDirectory<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route("/api/v1/accounts", post(register_handler::<S>))
        .with_state(directory)
}

/// Lookups that need an authenticated actor.
pub fn directory_router<S>(directory: Arc<AccountDirectory<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route("/api/v1/accounts/me", get(me_handler::<S>))
        .route("/api/v1/recipients", get(recipients_handler::<S>))
        .with_state(directory)
}

pub(crate) async fn register_handler<S>(
    State(directory): State<Arc<AccountDirectory<S>>>,
    Json(registration): Json<TenantRegistration>,
) -> Result<(StatusCode, Json<RegisteredTenant>), ServiceError>
where
    S: RentalStore + 'static,
{
    let registered = directory.register_tenant(registration)?;
    Ok((StatusCode::CREATED, Json(registered)))
}

pub(crate) async fn me_handler<S>(
    State(directory): State<Arc<AccountDirectory<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserAccount>, ServiceError>
where
    S: RentalStore + 'static,
{
    directory.get(actor.user_id).map(Json)
}

pub(crate) async fn recipients_handler<S>(
    State(directory): State<Arc<AccountDirectory<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<UserAccount>>, ServiceError>
where
    S: RentalStore + 'static,
{
    directory.recipients(&actor).map(Json)
}

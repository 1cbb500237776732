use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use super::domain::{
    DenialRequest, Reservation, ReservationChanges, ReservationId, ReservationQuery,
    ReservationRequest,
};
use super::service::ReservationLifecycle;
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

/// Router builder exposing the reservation lifecycle.
pub fn reservation_router<S>(lifecycle: Arc<ReservationLifecycle<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/reservations",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/reservations/:reservation_id",
            get(get_handler::<S>).put(update_handler::<S>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/deny",
            post(deny_handler::<S>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/cancel",
            post(cancel_handler::<S>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/complete",
            post(complete_handler::<S>),
        )
        .with_state(lifecycle)
}

pub(crate) async fn list_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ReservationQuery>,
) -> Result<Json<Vec<Reservation>>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle.list(&actor, &query).map(Json)
}

pub(crate) async fn create_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ServiceError>
where
    S: RentalStore + 'static,
{
    let reservation = lifecycle.create(&actor, request)?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub(crate) async fn get_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .get(&actor, ReservationId(reservation_id))
        .map(Json)
}

pub(crate) async fn update_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
    Json(changes): Json<ReservationChanges>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .update(&actor, ReservationId(reservation_id), changes)
        .map(Json)
}

pub(crate) async fn approve_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .approve(&actor, ReservationId(reservation_id))
        .map(Json)
}

pub(crate) async fn deny_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
    Json(denial): Json<DenialRequest>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .deny(&actor, ReservationId(reservation_id), &denial.reason)
        .map(Json)
}

pub(crate) async fn cancel_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .cancel(&actor, ReservationId(reservation_id))
        .map(Json)
}

pub(crate) async fn complete_handler<S>(
    State(lifecycle): State<Arc<ReservationLifecycle<S>>>,
    Extension(actor): Extension<Actor>,
    Path(reservation_id): Path<u64>,
) -> Result<Json<Reservation>, ServiceError>
where
    S: RentalStore + 'static,
{
    lifecycle
        .complete(&actor, ReservationId(reservation_id))
        .map(Json)
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use super::domain::{Apartment, ApartmentDraft, ApartmentFilter, ApartmentId};
use super::service::ApartmentRegistry;
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

pub fn apartment_router<S>(registry: Arc<ApartmentRegistry<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/apartments",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/apartments/:apartment_id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(registry)
}

pub(crate) async fn list_handler<S>(
    State(registry): State<Arc<ApartmentRegistry<S>>>,
    Query(filter): Query<ApartmentFilter>,
) -> Result<Json<Vec<Apartment>>, ServiceError>
where
    S: RentalStore + 'static,
{
    registry.list(&filter).map(Json)
}

pub(crate) async fn get_handler<S>(
    State(registry): State<Arc<ApartmentRegistry<S>>>,
    Path(apartment_id): Path<u64>,
) -> Result<Json<Apartment>, ServiceError>
where
    S: RentalStore + 'static,
{
    registry.get(ApartmentId(apartment_id)).map(Json)
}

pub(crate) async fn create_handler<S>(
    State(registry): State<Arc<ApartmentRegistry<S>>>,
    Extension(actor): Extension<Actor>,
    Json(draft): Json<ApartmentDraft>,
) -> Result<(StatusCode, Json<Apartment>), ServiceError>
where
    S: RentalStore + 'static,
{
    let apartment = registry.create(&actor, draft)?;
    Ok((StatusCode::CREATED, Json(apartment)))
}

pub(crate) async fn update_handler<S>(
    State(registry): State<Arc<ApartmentRegistry<S>>>,
    Extension(actor): Extension<Actor>,
    Path(apartment_id): Path<u64>,
    Json(draft): Json<ApartmentDraft>,
) -> Result<Json<Apartment>, ServiceError>
where
    S: RentalStore + 'static,
{
    registry
        .update(&actor, ApartmentId(apartment_id), draft)
        .map(Json)
}

pub(crate) async fn delete_handler<S>(
    State(registry): State<Arc<ApartmentRegistry<S>>>,
    Extension(actor): Extension<Actor>,
    Path(apartment_id): Path<u64>,
) -> Result<StatusCode, ServiceError>
where
    S: RentalStore + 'static,
{
    registry.delete(&actor, ApartmentId(apartment_id))?;
    Ok(StatusCode::NO_CONTENT)
}

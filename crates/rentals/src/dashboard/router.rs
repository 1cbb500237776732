use std::sync::Arc;

use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;

use super::service::Dashboard;
use super::views::{AdminOverview, MyApartment, Overview};
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

pub fn dashboard_router<S>(dashboard: Arc<Dashboard<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(overview_handler::<S>))
        .route("/api/v1/dashboard/admin", get(admin_handler::<S>))
        .route(
            "/api/v1/dashboard/my-apartment",
            get(my_apartment_handler::<S>),
        )
        .with_state(dashboard)
}

pub(crate) async fn overview_handler<S>(
    State(dashboard): State<Arc<Dashboard<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Overview>, ServiceError>
where
    S: RentalStore + 'static,
{
    dashboard.overview(&actor).map(Json)
}

pub(crate) async fn admin_handler<S>(
    State(dashboard): State<Arc<Dashboard<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<AdminOverview>, ServiceError>
where
    S: RentalStore + 'static,
{
    dashboard
        .admin_overview(&actor, Utc::now().date_naive())
        .map(Json)
}

pub(crate) async fn my_apartment_handler<S>(
    State(dashboard): State<Arc<Dashboard<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<MyApartment>, ServiceError>
where
    S: RentalStore + 'static,
{
    dashboard
        .my_apartment(&actor, Utc::now().date_naive())
        .map(Json)
}

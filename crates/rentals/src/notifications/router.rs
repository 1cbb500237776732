use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use super::domain::{Notification, NotificationFeed, NotificationId};
use super::service::NotificationCenter;
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::RentalStore;

/// Router builder exposing the caller's notification log.
pub fn notification_router<S>(service: Arc<NotificationCenter<S>>) -> Router
where
    S: RentalStore + 'static,
{
    Router::new()
        .route("/api/v1/notifications", get(feed_handler::<S>))
        .route(
            "/api/v1/notifications/read-all",
            post(mark_all_read_handler::<S>),
        )
        .route("/api/v1/notifications/clear", post(clear_handler::<S>))
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:notification_id",
            delete(delete_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn feed_handler<S>(
    State(service): State<Arc<NotificationCenter<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<NotificationFeed>, ServiceError>
where
    S: RentalStore + 'static,
{
    service.feed(&actor).map(Json)
}

pub(crate) async fn mark_read_handler<S>(
    State(service): State<Arc<NotificationCenter<S>>>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<u64>,
) -> Result<Json<Notification>, ServiceError>
where
    S: RentalStore + 'static,
{
    service
        .mark_read(&actor, NotificationId(notification_id))
        .map(Json)
}

pub(crate) async fn mark_all_read_handler<S>(
    State(service): State<Arc<NotificationCenter<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ServiceError>
where
    S: RentalStore + 'static,
{
    let updated = service.mark_all_read(&actor)?;
    Ok(Json(json!({ "updated": updated })))
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<NotificationCenter<S>>>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<u64>,
) -> Result<StatusCode, ServiceError>
where
    S: RentalStore + 'static,
{
    service.delete(&actor, NotificationId(notification_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn clear_handler<S>(
    State(service): State<Arc<NotificationCenter<S>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ServiceError>
where
    S: RentalStore + 'static,
{
    let removed = service.clear_all(&actor)?;
    Ok(Json(json!({
        "removed": removed,
        "message": format!("{removed} notification(s) cleared!"),
    })))
}

//! JSON surface over the rental services.
//!
//! Credentials are handled upstream; the gateway forwards the authenticated user id in
//! [`ACTOR_HEADER`]. [`require_actor`] resolves it to an [`Actor`] once per request and every
//! handler reads it back with `Extension<Actor>`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::access::Actor;
use crate::accounts::{directory_router, registration_router, AccountDirectory, UserId};
use crate::apartments::apartment_router;
use crate::app::Rentals;
use crate::dashboard::dashboard_router;
use crate::messaging::conversation_router;
use crate::notifications::notification_router;
use crate::reservations::reservation_router;
use crate::store::RentalStore;

pub const ACTOR_HEADER: &str = "x-rentals-user";

pub async fn require_actor<S>(
    State(directory): State<Arc<AccountDirectory<S>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: RentalStore + 'static,
{
    let user_id = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let actor: Actor = directory.resolve(UserId(user_id)).map_err(|err| {
        tracing::debug!(user = user_id, error = %err, "rejected request for unknown actor");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Every `/api/v1` route; only tenant registration skips the actor check.
pub fn api_router<S>(rentals: &Rentals<S>) -> Router
where
    S: RentalStore + 'static,
{
    let protected = Router::new()
        .merge(directory_router(Arc::clone(&rentals.accounts)))
        .merge(apartment_router(Arc::clone(&rentals.apartments)))
        .merge(reservation_router(Arc::clone(&rentals.reservations)))
        .merge(notification_router(Arc::clone(&rentals.notifications)))
        .merge(conversation_router(Arc::clone(&rentals.messaging)))
        .merge(dashboard_router(Arc::clone(&rentals.dashboard)))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&rentals.accounts),
            require_actor::<S>,
        ));

    Router::new()
        .merge(registration_router(Arc::clone(&rentals.accounts)))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{registration, seed_user, Fixture};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn read_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn get_as(path: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(path);
        if let Some(user) = user {
            builder = builder.header(ACTOR_HEADER, user);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn missing_or_unknown_actor_is_unauthorized() {
        let fixture = Fixture::new();
        let app = api_router(&fixture.rentals);

        for user in [None, Some("not-a-number"), Some("41")] {
            let response = app
                .clone()
                .oneshot(get_as("/api/v1/apartments", user))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{user:?}");
        }
    }

    #[tokio::test]
    async fn resolved_actor_reaches_handlers() {
        let fixture = Fixture::new();
        let account = seed_user(&fixture.store, "ana", false);
        let app = api_router(&fixture.rentals);

        let response = app
            .oneshot(get_as("/api/v1/accounts/me", Some(&account.id.to_string())))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["username"], "ana");
    }

    #[tokio::test]
    async fn registration_is_public() {
        let fixture = Fixture::new();
        let app = api_router(&fixture.rentals);

        let response = app
            .oneshot(
                Request::post("/api/v1/accounts")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_string(&registration("ana", "PH-0001"))
                            .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["account"]["is_staff"], false);
        assert_eq!(body["profile"]["id_number"], "PH-0001");
    }

    #[tokio::test]
    async fn staff_only_routes_answer_forbidden_for_tenants() {
        let fixture = Fixture::new();
        let tenant = seed_user(&fixture.store, "ana", false);
        let app = api_router(&fixture.rentals);
        let tenant_id = tenant.id.to_string();

        let response = app
            .clone()
            .oneshot(get_as("/api/v1/dashboard/admin", Some(&tenant_id)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["error"], "Access denied. Admin only.");

        let response = app
            .oneshot(
                Request::post("/api/v1/apartments")
                    .header(ACTOR_HEADER, tenant_id.as_str())
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "name": "Azure Residences",
                            "apartment_type": "studio",
                            "floor": 2,
                            "unit_number": "U-201",
                            "price_per_month": 9000,
                            "size_sqm": 28.0,
                            "bedrooms": 0,
                            "bathrooms": 1
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn notification_routes_round_trip_over_http() {
        let fixture = Fixture::new();
        let staff = seed_user(&fixture.store, "sam", true);
        let tenant = seed_user(&fixture.store, "ana", false);
        let app = api_router(&fixture.rentals);

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/v1/conversations")
                    .header(ACTOR_HEADER, tenant.id.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "recipient": staff.id, "content": "Hi" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);

        let staff_id = staff.id.to_string();
        let feed = read_json(
            app.clone()
                .oneshot(get_as("/api/v1/notifications", Some(&staff_id)))
                .await
                .expect("response"),
        )
        .await;
        assert_eq!(feed["unread_count"], 1);
        assert_eq!(feed["notifications"][0]["notification_type"], "new_message");
        assert_eq!(feed["notifications"][0]["message"], "New message from ana");

        let response = app
            .oneshot(
                Request::post("/api/v1/notifications/clear")
                    .header(ACTOR_HEADER, staff_id.as_str())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["removed"], 1);
        assert_eq!(body["message"], "1 notification(s) cleared!");
    }
}

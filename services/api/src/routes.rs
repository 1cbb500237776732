use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use rentals::http::api_router;
use rentals::store::RentalStore;
use rentals::Rentals;
use serde_json::json;

pub(crate) fn with_rental_routes<S>(rentals: &Rentals<S>) -> axum::Router
where
    S: RentalStore + 'static,
{
    api_router(rentals)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rentals::reservations::TransitionPolicy;
    use rentals::store::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<AtomicBool>) {
        let rentals = Rentals::new(Arc::new(MemoryStore::new()), TransitionPolicy::Strict);
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: Arc::clone(&readiness),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        (with_rental_routes(&rentals).layer(Extension(state)), readiness)
    }

    async fn get_status(app: axum::Router, path: &str) -> StatusCode {
        app.oneshot(Request::get(path).body(Body::empty()).expect("request"))
            .await
            .expect("response")
            .status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (app, _) = app(false);
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let (app, readiness) = app(false);
        assert_eq!(
            get_status(app.clone(), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        readiness.store(true, Ordering::Release);
        assert_eq!(get_status(app, "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn rental_routes_require_an_actor() {
        let (app, _) = app(true);
        assert_eq!(
            get_status(app, "/api/v1/reservations").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let (app, _) = app(true);
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}

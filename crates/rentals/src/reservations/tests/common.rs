use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::access::Actor;
use crate::apartments::Apartment;
use crate::notifications::{Notification, NotificationKind};
use crate::reservations::{ReservationRequest, TransitionPolicy};
use crate::testing::{actor_for, apartment_draft, seed_user, Fixture};

/// Two tenants, one staff member and an available unit U-101 at 10,000 a month.
pub(super) struct Scene {
    pub(super) fixture: Fixture,
    pub(super) admin: Actor,
    pub(super) t1: Actor,
    pub(super) t2: Actor,
    pub(super) unit: Apartment,
}

pub(super) fn scene() -> Scene {
    scene_with_policy(TransitionPolicy::Strict)
}

pub(super) fn scene_with_policy(policy: TransitionPolicy) -> Scene {
    let fixture = Fixture::with_policy(policy);
    let admin = actor_for(&seed_user(&fixture.store, "admin", true));
    let t1 = actor_for(&seed_user(&fixture.store, "t1", false));
    let t2 = actor_for(&seed_user(&fixture.store, "t2", false));
    let unit = fixture
        .rentals
        .apartments
        .create(&admin, apartment_draft("U-101", 10_000))
        .expect("seed unit");
    Scene {
        fixture,
        admin,
        t1,
        t2,
        unit,
    }
}

pub(super) fn move_in() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

pub(super) fn request(unit: &Apartment) -> ReservationRequest {
    ReservationRequest {
        apartment: unit.id,
        move_in: move_in(),
        special_requests: "Ground floor parking".to_string(),
        auto_approve: false,
    }
}

pub(super) fn notifications_of(fixture: &Fixture, actor: &Actor) -> Vec<Notification> {
    fixture
        .rentals
        .notifications
        .feed(actor)
        .expect("feed")
        .notifications
}

pub(super) fn count_kind(fixture: &Fixture, actor: &Actor, kind: NotificationKind) -> usize {
    notifications_of(fixture, actor)
        .iter()
        .filter(|notification| notification.kind == kind)
        .count()
}

pub(super) fn unit_status(scene: &Scene) -> crate::apartments::ApartmentStatus {
    scene
        .fixture
        .rentals
        .apartments
        .get(scene.unit.id)
        .expect("unit")
        .status
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

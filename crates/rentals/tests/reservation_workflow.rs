use std::sync::Arc;

use chrono::NaiveDate;
use rentals::access::Actor;
use rentals::accounts::TenantRegistration;
use rentals::apartments::{ApartmentDraft, ApartmentFixture, ApartmentStatus, ApartmentType};
use rentals::notifications::NotificationKind;
use rentals::reservations::{ReservationRequest, ReservationStatus, TransitionPolicy};
use rentals::store::MemoryStore;
use rentals::{Rentals, ServiceError};

fn rentals() -> Rentals<MemoryStore> {
    Rentals::new(Arc::new(MemoryStore::new()), TransitionPolicy::default())
}

fn tenant(rentals: &Rentals<MemoryStore>, username: &str, id_number: &str) -> Actor {
    let registered = rentals
        .accounts
        .register_tenant(TenantRegistration {
            username: username.to_string(),
            full_name: format!("Tenant {username}"),
            email: format!("{username}@example.com"),
            phone: String::new(),
            address: String::new(),
            emergency_contact: String::new(),
            emergency_phone: String::new(),
            id_number: id_number.to_string(),
        })
        .expect("tenant registers");
    Actor::from_account(&registered.account)
}

fn staff(rentals: &Rentals<MemoryStore>, username: &str) -> Actor {
    let account = rentals
        .accounts
        .provision_staff(username, "Building Admin")
        .expect("staff provisioned");
    Actor::from_account(&account)
}

fn u101() -> ApartmentDraft {
    ApartmentDraft {
        name: "Azure Residences".to_string(),
        apartment_type: ApartmentType::OneBedroom,
        floor: 1,
        unit_number: "U-101".to_string(),
        price_per_month: 10_000,
        size_sqm: 35.0,
        bedrooms: 1,
        bathrooms: 1,
        status: ApartmentStatus::Available,
        description: "Garden-facing unit".to_string(),
        amenities: "Pool, Gym".to_string(),
        image: None,
    }
}

#[test]
fn approval_occupies_unit_and_blocks_second_tenant() {
    let rentals = rentals();
    let admin = staff(&rentals, "admin");
    let t1 = tenant(&rentals, "t1", "ID-001");
    let t2 = tenant(&rentals, "t2", "ID-002");
    let unit = rentals.apartments.create(&admin, u101()).expect("unit created");
    let move_in = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    let reservation = rentals
        .reservations
        .create(
            &t1,
            ReservationRequest {
                apartment: unit.id,
                move_in,
                special_requests: String::new(),
                auto_approve: false,
            },
        )
        .expect("t1 reserves");
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(
        rentals.apartments.get(unit.id).expect("unit").status,
        ApartmentStatus::Available
    );
    let staff_feed = rentals.notifications.feed(&admin).expect("feed");
    assert_eq!(staff_feed.notifications.len(), 1);
    assert_eq!(
        staff_feed.notifications[0].kind,
        NotificationKind::NewReservation
    );

    rentals
        .reservations
        .approve(&admin, reservation.id)
        .expect("admin approves");
    assert_eq!(
        rentals.apartments.get(unit.id).expect("unit").status,
        ApartmentStatus::Occupied
    );
    let tenant_feed = rentals.notifications.feed(&t1).expect("feed");
    assert_eq!(tenant_feed.unread_count, 1);
    assert_eq!(
        tenant_feed.notifications[0].kind,
        NotificationKind::ReservationApproved
    );

    let blocked = rentals.reservations.create(
        &t2,
        ReservationRequest {
            apartment: unit.id,
            move_in,
            special_requests: String::new(),
            auto_approve: false,
        },
    );
    assert!(matches!(blocked, Err(ServiceError::Validation(_))));
}

#[test]
fn clear_all_removes_exactly_what_it_reports() {
    let rentals = rentals();
    let admin = staff(&rentals, "admin");
    let t1 = tenant(&rentals, "t1", "ID-001");
    let t2 = tenant(&rentals, "t2", "ID-002");

    for unit_number in ["U-101", "U-102", "U-103"] {
        let mut draft = u101();
        draft.unit_number = unit_number.to_string();
        let unit = rentals.apartments.create(&admin, draft).expect("unit");
        let reservation = rentals
            .reservations
            .create(
                &t1,
                ReservationRequest {
                    apartment: unit.id,
                    move_in: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
                    special_requests: String::new(),
                    auto_approve: false,
                },
            )
            .expect("reserve");
        rentals
            .reservations
            .deny(&admin, reservation.id, "Unit reserved for staff housing")
            .expect("deny");
    }
    rentals
        .messaging
        .start_or_continue(
            &admin,
            rentals::messaging::OutgoingMessage {
                recipient: t2.user_id,
                subject: None,
                content: "Welcome!".to_string(),
            },
        )
        .expect("message t2");

    let before = rentals.notifications.feed(&t1).expect("feed").notifications.len();
    let removed = rentals.notifications.clear_all(&t1).expect("clear");
    assert_eq!(removed, before);
    assert_eq!(removed, 3);
    assert_eq!(rentals.notifications.unread_count(&t1).expect("count"), 0);
    assert_eq!(rentals.notifications.unread_count(&t2).expect("count"), 1);
}

#[test]
fn fixture_import_seeds_bookable_units() {
    let rentals = rentals();
    let t1 = tenant(&rentals, "t1", "ID-001");

    let csv = "name,apartment_type,floor,unit_number,price_per_month,size_sqm,bedrooms,bathrooms,status,description,amenities\n\
Azure Residences,studio,2,S-201,9000,24,0,1,available,Compact studio,Wifi\n\
Azure Residences,3br,12,F-1201,42000,96,3,2,maintenance,Family unit,\"Balcony, Parking\"\n";
    let fixture = ApartmentFixture::from_reader(csv.as_bytes()).expect("fixture parses");
    assert_eq!(fixture.len(), 2);
    let summary = rentals.apartments.import(fixture).expect("import");
    assert_eq!(summary.imported, 2);

    let listings = rentals
        .apartments
        .list(&Default::default())
        .expect("listings");
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[1].amenities_list(), vec!["Balcony", "Parking"]);

    let studio = &listings[0];
    let reservation = rentals
        .reservations
        .create(
            &t1,
            ReservationRequest {
                apartment: studio.id,
                move_in: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
                special_requests: String::new(),
                auto_approve: false,
            },
        )
        .expect("reserve imported unit");
    assert_eq!(reservation.total_price, Some(9_000));

    let family = &listings[1];
    assert!(matches!(
        rentals.reservations.create(
            &t1,
            ReservationRequest {
                apartment: family.id,
                move_in: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
                special_requests: String::new(),
                auto_approve: false,
            },
        ),
        Err(ServiceError::Validation(_))
    ));
}

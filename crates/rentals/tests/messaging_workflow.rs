use std::sync::Arc;

use rentals::access::Actor;
use rentals::accounts::TenantRegistration;
use rentals::messaging::{OutgoingMessage, Reply};
use rentals::notifications::NotificationKind;
use rentals::reservations::TransitionPolicy;
use rentals::store::MemoryStore;
use rentals::Rentals;

fn setup() -> (Rentals<MemoryStore>, Actor, Actor) {
    let rentals = Rentals::new(Arc::new(MemoryStore::new()), TransitionPolicy::Strict);
    let staff = rentals
        .accounts
        .provision_staff("sam", "Sam Staff")
        .expect("staff");
    let tenant = rentals
        .accounts
        .register_tenant(TenantRegistration {
            username: "ana".to_string(),
            full_name: "Ana Tenant".to_string(),
            email: "ana@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            emergency_contact: String::new(),
            emergency_phone: String::new(),
            id_number: "ID-001".to_string(),
        })
        .expect("tenant")
        .account;
    (
        rentals,
        Actor::from_account(&tenant),
        Actor::from_account(&staff),
    )
}

#[test]
fn messaging_staff_twice_reuses_one_conversation() {
    let (rentals, tenant, staff) = setup();

    let first = rentals
        .messaging
        .start_or_continue(
            &tenant,
            OutgoingMessage {
                recipient: staff.user_id,
                subject: None,
                content: "Hi".to_string(),
            },
        )
        .expect("first message");
    assert!(first.started_conversation);
    assert_eq!(first.conversation.participants.len(), 2);
    assert!(first.conversation.has_participant(tenant.user_id));
    assert!(first.conversation.has_participant(staff.user_id));

    let staff_feed = rentals.notifications.feed(&staff).expect("feed");
    assert_eq!(staff_feed.notifications.len(), 1);
    assert_eq!(staff_feed.notifications[0].kind, NotificationKind::NewMessage);

    let second = rentals
        .messaging
        .start_or_continue(
            &tenant,
            OutgoingMessage {
                recipient: staff.user_id,
                subject: Some("Ignored for existing threads".to_string()),
                content: "Any news?".to_string(),
            },
        )
        .expect("second message");
    assert_eq!(second.conversation.id, first.conversation.id);
    assert_eq!(second.conversation.subject, "General Inquiry");

    let inbox = rentals.messaging.inbox(&tenant).expect("inbox");
    assert_eq!(inbox.entries.len(), 1);
    let thread = rentals
        .messaging
        .open(&tenant, first.conversation.id)
        .expect("thread");
    assert_eq!(thread.messages.len(), 2);
}

#[test]
fn read_receipts_follow_the_viewer() {
    let (rentals, tenant, staff) = setup();
    let delivery = rentals
        .messaging
        .start_or_continue(
            &tenant,
            OutgoingMessage {
                recipient: staff.user_id,
                subject: Some("Parking".to_string()),
                content: "Is there a slot for a motorcycle?".to_string(),
            },
        )
        .expect("send");

    assert_eq!(rentals.messaging.inbox(&staff).expect("inbox").total_unread, 1);
    rentals
        .messaging
        .reply(
            &staff,
            delivery.conversation.id,
            Reply {
                content: "Yes, B2 level.".to_string(),
            },
        )
        .expect("reply");

    assert_eq!(rentals.messaging.inbox(&staff).expect("inbox").total_unread, 0);
    let tenant_inbox = rentals.messaging.inbox(&tenant).expect("inbox");
    assert_eq!(tenant_inbox.total_unread, 1);
    assert_eq!(
        tenant_inbox.entries[0]
            .last_message
            .as_ref()
            .map(|message| message.content.as_str()),
        Some("Yes, B2 level.")
    );
}

use crate::infra::parse_policy;
use chrono::{Local, NaiveDate};
use clap::Args;
use rentals::access::Actor;
use rentals::accounts::TenantRegistration;
use rentals::apartments::{ApartmentDraft, ApartmentStatus, ApartmentType};
use rentals::messaging::{OutgoingMessage, Reply};
use rentals::reservations::{ReservationRequest, TransitionPolicy};
use rentals::store::MemoryStore;
use rentals::{AppError, Rentals};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Transition rules to apply (strict or legacy)
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: Option<TransitionPolicy>,
    /// Move-in date for the sample request (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub(crate) move_in: Option<NaiveDate>,
    /// Skip the messaging portion of the demo.
    #[arg(long)]
    pub(crate) skip_messaging: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let policy = args.policy.unwrap_or_default();
    let today = Local::now().date_naive();
    let move_in = args.move_in.unwrap_or(today);
    let rentals = Rentals::new(Arc::new(MemoryStore::new()), policy);

    let admin = Actor::from_account(&rentals.accounts.provision_staff("admin", "Building Admin")?);
    let ana = Actor::from_account(&rentals.accounts.register_tenant(sample_tenant("ana", "PH-0001"))?.account);
    let ben = Actor::from_account(&rentals.accounts.register_tenant(sample_tenant("ben", "PH-0002"))?.account);

    let unit = rentals.apartments.create(&admin, sample_unit("U-101", 10_000))?;

    println!("Rentals workflow demo");
    println!(
        "- Policy: {:?} | Unit {} | {} per month | {}",
        policy,
        unit.unit_number,
        unit.price_per_month,
        unit.status.label()
    );

    println!("\nReservation lifecycle");
    let first = rentals.reservations.create(
        &ana,
        ReservationRequest {
            apartment: unit.id,
            move_in,
            special_requests: "Ground floor parking if possible".to_string(),
            auto_approve: false,
        },
    )?;
    println!(
        "  {} requested Unit {} for {} (status: {}, total: {})",
        ana.username,
        unit.unit_number,
        first.move_in,
        first.status,
        first.total_price.unwrap_or_default()
    );

    let second = rentals.reservations.create(
        &ben,
        ReservationRequest {
            apartment: unit.id,
            move_in,
            special_requests: String::new(),
            auto_approve: false,
        },
    )?;
    println!(
        "  {} requested the same unit (status: {})",
        ben.username, second.status
    );

    let approved = rentals.reservations.approve(&admin, first.id)?;
    let unit = rentals.apartments.get(unit.id)?;
    println!(
        "  {} approved reservation {} -> unit is now {}",
        admin.username,
        approved.id,
        unit.status.label()
    );

    match rentals.reservations.approve(&admin, second.id) {
        Ok(reservation) => println!(
            "  Second approval went through (status: {})",
            reservation.status
        ),
        Err(err) => {
            println!("  Second approval rejected: {}", err);
            let denied = rentals
                .reservations
                .deny(&admin, second.id, "Unit already leased")?;
            println!("  Reservation {} is now {}", denied.id, denied.status);
        }
    }

    for actor in [&admin, &ana, &ben] {
        render_notifications(&rentals, actor)?;
    }

    if !args.skip_messaging {
        render_conversation(&rentals, &ana, &admin)?;
    }

    let overview = rentals.dashboard.admin_overview(&admin, today)?;
    println!("\nAdmin dashboard");
    println!(
        "  Tenants: {} | Reservations: {} | Pending: {} | Approved today: {}",
        overview.total_tenants,
        overview.total_reservations,
        overview.pending_reservations.len(),
        overview.approved_today
    );

    Ok(())
}

fn render_notifications(rentals: &Rentals<MemoryStore>, actor: &Actor) -> Result<(), AppError> {
    let feed = rentals.notifications.feed(actor)?;
    println!(
        "\nNotifications for {} ({} unread)",
        actor.username, feed.unread_count
    );
    if feed.notifications.is_empty() {
        println!("  none");
    }
    for notification in &feed.notifications {
        println!(
            "  - [{}] {}",
            notification.kind.label(),
            notification.message
        );
    }
    Ok(())
}

fn render_conversation(
    rentals: &Rentals<MemoryStore>,
    tenant: &Actor,
    staff: &Actor,
) -> Result<(), AppError> {
    println!("\nMessaging");
    let delivery = rentals.messaging.start_or_continue(
        tenant,
        OutgoingMessage {
            recipient: staff.user_id,
            subject: Some("Move-in keys".to_string()),
            content: "When can I pick up the keys?".to_string(),
        },
    )?;
    println!(
        "  {} opened \"{}\" (conversation {})",
        tenant.username, delivery.conversation.subject, delivery.conversation.id
    );

    let inbox = rentals.messaging.inbox(staff)?;
    println!("  {} has {} unread message(s)", staff.username, inbox.total_unread);

    rentals.messaging.reply(
        staff,
        delivery.conversation.id,
        Reply {
            content: "Any weekday after 9am at the lobby desk.".to_string(),
        },
    )?;

    let thread = rentals.messaging.open(tenant, delivery.conversation.id)?;
    for message in &thread.messages {
        let author = if message.sender == tenant.user_id {
            &tenant.username
        } else {
            &staff.username
        };
        println!("  {}: {}", author, message.content);
    }
    Ok(())
}

fn sample_tenant(username: &str, id_number: &str) -> TenantRegistration {
    TenantRegistration {
        username: username.to_string(),
        full_name: format!("{} Tenant", username),
        email: format!("{}@example.com", username),
        phone: "0917-000-0000".to_string(),
        address: "Quezon City".to_string(),
        emergency_contact: String::new(),
        emergency_phone: String::new(),
        id_number: id_number.to_string(),
    }
}

fn sample_unit(unit_number: &str, price_per_month: u32) -> ApartmentDraft {
    ApartmentDraft {
        name: "Azure Residences".to_string(),
        apartment_type: ApartmentType::OneBedroom,
        floor: 1,
        unit_number: unit_number.to_string(),
        price_per_month,
        size_sqm: 36.0,
        bedrooms: 1,
        bathrooms: 1,
        status: ApartmentStatus::Available,
        description: "Corner unit facing the courtyard".to_string(),
        amenities: "Aircon, Balcony".to_string(),
        image: None,
    }
}

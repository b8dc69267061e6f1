//! Booking coordinator integration tests using SQLx native testing.
//!
//! Covers the atomic create/update unit of work: conflict detection, cost
//! aggregation into the invoice, update policy, and the wholesale service-line
//! replacement semantics.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;

use common::*;
use venue_booking_core::booking::{Actor, BookingCoordinator, UpdateBookingRequest};
use venue_booking_core::constants::AccountRole;
use venue_booking_core::models::{Event, EventService, Invoice, InvoiceDetail};
use venue_booking_core::notifier::Notifier;

#[sqlx::test]
async fn test_create_minimal_booking(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());

    let response = coordinator.create_booking(booking_request("Team standup")).await;
    assert!(response.success, "errors: {:?}", response.errors);

    let record = response.data.unwrap();
    assert_eq!(record.event.name, "Team standup");
    assert_eq!(record.event.status, "PENDING");
    assert_eq!(record.event.estimated_cost, Decimal::ZERO);
    // Zero cost means no invoice is synthesized
    assert!(record.invoice.is_none());

    let stored = Event::find_by_id(&pool, record.event.event_id).await?;
    assert!(stored.is_some());
    Ok(())
}

#[sqlx::test]
async fn test_room_conflict_scenario(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let room = create_room(&pool, dec!(0), dec!(0)).await;

    // 10:00-12:00, confirmed, holds the room
    let mut first = booking_request("Morning workshop");
    first.room_id = Some(room.room_id);
    first.duration_hours = Some(dec!(2));
    first.status = Some("CONFIRMED".to_string());
    let first_response = coordinator.create_booking(first).await;
    assert!(first_response.success, "errors: {:?}", first_response.errors);
    let first_event = first_response.data.unwrap().event;

    // 11:00 for 1h overlaps and must be rejected, naming the first booking
    let mut second = booking_request("Conflicting meeting");
    second.room_id = Some(room.room_id);
    second.start_time = at((2026, 9, 1), 11, 0);
    second.end_time = at((2026, 9, 1), 12, 0);
    second.duration_hours = Some(dec!(1));
    let second_response = coordinator.create_booking(second).await;
    assert!(!second_response.success);
    assert!(second_response
        .errors
        .iter()
        .any(|e| e.contains(&first_event.event_id.to_string())));

    // 12:00-13:00 merely touches the first window: allowed
    let mut third = booking_request("Afternoon session");
    third.room_id = Some(room.room_id);
    third.start_time = at((2026, 9, 1), 12, 0);
    third.end_time = at((2026, 9, 1), 13, 0);
    third.duration_hours = Some(dec!(1));
    let third_response = coordinator.create_booking(third).await;
    assert!(third_response.success, "errors: {:?}", third_response.errors);

    Ok(())
}

#[sqlx::test]
async fn test_pending_bookings_do_not_block(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let room = create_room(&pool, dec!(0), dec!(0)).await;

    let mut first = booking_request("Tentative");
    first.room_id = Some(room.room_id);
    first.duration_hours = Some(dec!(2));
    assert!(coordinator.create_booking(first).await.success);

    // Same window, but the holder is only PENDING
    let mut second = booking_request("Same window");
    second.room_id = Some(room.room_id);
    second.duration_hours = Some(dec!(2));
    assert!(coordinator.create_booking(second).await.success);

    Ok(())
}

#[sqlx::test]
async fn test_cost_aggregation_and_invoice(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let room = create_room(&pool, dec!(100), dec!(20)).await;
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(80), true).await;

    // base 100 + hourly 20x2 + line 50x2 = 240
    let mut request = booking_request("Gala dinner");
    request.room_id = Some(room.room_id);
    request.duration_hours = Some(dec!(2));
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.custom_price = Some(dec!(50));
    line.quantity = Some(2);
    request.service_lines = vec![line];

    let response = coordinator.create_booking(request).await;
    assert!(response.success, "errors: {:?}", response.errors);
    let record = response.data.unwrap();

    assert_eq!(record.event.estimated_cost, dec!(240));

    let invoice = record.invoice.expect("invoice must exist for non-zero cost");
    assert_eq!(invoice.total_amount, dec!(240));
    assert_eq!(invoice.due_date, invoice.issue_date + Duration::days(7));

    let details = InvoiceDetail::list_for_invoice(&pool, invoice.invoice_id).await?;
    assert_eq!(details.len(), 2);
    let detail_sum: Decimal = details.iter().map(|d| d.subtotal).sum();
    assert_eq!(detail_sum, invoice.total_amount);
    assert!(details.iter().any(|d| d.item_type == "ROOM" && d.subtotal == dec!(140)));
    assert!(details.iter().any(|d| d.item_type == "SERVICE" && d.subtotal == dec!(100)));

    Ok(())
}

#[sqlx::test]
async fn test_cost_override_becomes_base_charge_line(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;

    // Caller-supplied 50 on top of one 2 x 25 line
    let mut request = booking_request("Sponsored gala");
    request.estimated_cost = Some(dec!(50));
    let mut line = service_line(service.service_id, None);
    line.custom_price = Some(dec!(25));
    line.quantity = Some(2);
    request.service_lines = vec![line];

    let response = coordinator.create_booking(request).await;
    assert!(response.success, "errors: {:?}", response.errors);
    let record = response.data.unwrap();
    assert_eq!(record.event.estimated_cost, dec!(100));

    let invoice = record.invoice.unwrap();
    assert_eq!(invoice.total_amount, dec!(100));

    let details = InvoiceDetail::list_for_invoice(&pool, invoice.invoice_id).await?;
    assert!(details
        .iter()
        .any(|d| d.item_name == "Base charge" && d.subtotal == dec!(50)));
    let detail_sum: Decimal = details.iter().map(|d| d.subtotal).sum();
    assert_eq!(detail_sum, invoice.total_amount);

    Ok(())
}

#[sqlx::test]
async fn test_cost_override_survives_unrelated_update(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());

    let mut request = booking_request("Flat-rate hire");
    request.estimated_cost = Some(dec!(50));
    let record = coordinator.create_booking(request).await.data.unwrap();
    assert_eq!(record.event.estimated_cost, dec!(50));
    let invoice = record.invoice.unwrap();
    assert_eq!(invoice.total_amount, dec!(50));

    // Touching only the description must not recompute or rewrite the cost
    let update = UpdateBookingRequest {
        description: Some("weekend package".to_string()),
        ..Default::default()
    };
    let response = coordinator
        .update_booking(record.event.event_id, update, None)
        .await;
    assert!(response.success, "errors: {:?}", response.errors);

    let updated = response.data.unwrap();
    assert_eq!(updated.event.estimated_cost, dec!(50));
    assert_eq!(updated.invoice.unwrap().total_amount, dec!(50));

    let details = InvoiceDetail::list_for_invoice(&pool, invoice.invoice_id).await?;
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].item_name, "Base charge");

    Ok(())
}

#[sqlx::test]
async fn test_variation_base_price_used_without_override(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(80), true).await;

    let mut request = booking_request("AV setup");
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.quantity = Some(3);
    request.service_lines = vec![line];

    let response = coordinator.create_booking(request).await;
    assert!(response.success, "errors: {:?}", response.errors);
    assert_eq!(response.data.unwrap().event.estimated_cost, dec!(240));

    Ok(())
}

#[sqlx::test]
async fn test_validation_errors_abort_before_any_write(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());

    let mut request = booking_request("ok");
    request.name = "ab".to_string();
    request.estimated_cost = Some(dec!(-5));

    let response = coordinator.create_booking(request).await;
    assert!(!response.success);
    assert_eq!(response.errors.len(), 2);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_unknown_references_rejected(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());

    let mut request = booking_request("Dangling refs");
    request.room_id = Some(9999);
    let response = coordinator.create_booking(request).await;
    assert!(!response.success);
    assert!(response.errors[0].contains("room 9999"));

    let mut request = booking_request("Dangling account");
    request.account_id = Some(9999);
    let response = coordinator.create_booking(request).await;
    assert!(!response.success);
    assert!(response.errors[0].contains("account 9999"));

    Ok(())
}

#[sqlx::test]
async fn test_unavailable_room_short_circuits(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    // Nothing booked, but the room is under maintenance
    let room = create_room_with_status(&pool, dec!(0), dec!(0), true, "MAINTENANCE").await;

    let mut request = booking_request("Hopeful");
    request.room_id = Some(room.room_id);
    let response = coordinator.create_booking(request).await;
    assert!(!response.success);
    assert!(response.errors[0].contains("not available"));

    Ok(())
}

#[sqlx::test]
async fn test_variation_schedule_conflict(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(30), true).await;

    let mut first = booking_request("Band night");
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.scheduled_time = Some(at((2026, 9, 1), 18, 0));
    line.duration_hours = Some(dec!(3));
    first.service_lines = vec![line];
    assert!(coordinator.create_booking(first).await.success);

    // Same variation, 19:00-20:00, overlaps the confirmed line
    let mut second = booking_request("Competing gig");
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.scheduled_time = Some(at((2026, 9, 1), 19, 0));
    line.duration_hours = Some(dec!(1));
    second.service_lines = vec![line];
    let response = coordinator.create_booking(second).await;
    assert!(!response.success);
    assert!(response.errors[0].contains("overlaps"));

    Ok(())
}

#[sqlx::test]
async fn test_update_lead_time_policy(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let account = create_account(&pool, "CUSTOMER").await;
    let actor = Actor::new(account.account_id, AccountRole::Customer);

    // Start 10 hours from now: inside the lead-time window, update refused
    let mut soon = booking_request("Soon");
    soon.account_id = Some(account.account_id);
    soon.start_time = Utc::now().naive_utc() + Duration::hours(10);
    soon.end_time = soon.start_time + Duration::hours(2);
    let soon_id = coordinator
        .create_booking(soon)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    let update = UpdateBookingRequest {
        description: Some("new notes".to_string()),
        ..Default::default()
    };
    let response = coordinator.update_booking(soon_id, update, Some(actor)).await;
    assert!(!response.success);
    assert!(response.errors[0].contains("24 hours"));

    // Start 30 hours out: allowed
    let mut later = booking_request("Later");
    later.account_id = Some(account.account_id);
    later.start_time = Utc::now().naive_utc() + Duration::hours(30);
    later.end_time = later.start_time + Duration::hours(2);
    let later_id = coordinator
        .create_booking(later)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    let update = UpdateBookingRequest {
        description: Some("new notes".to_string()),
        ..Default::default()
    };
    let response = coordinator.update_booking(later_id, update, Some(actor)).await;
    assert!(response.success, "errors: {:?}", response.errors);
    assert_eq!(
        response.data.unwrap().event.description.as_deref(),
        Some("new notes")
    );

    Ok(())
}

#[sqlx::test]
async fn test_update_ownership_policy(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let owner = create_account(&pool, "CUSTOMER").await;
    let stranger = create_account(&pool, "CUSTOMER").await;
    let admin = create_account(&pool, "ADMIN").await;

    let mut request = booking_request("Private party");
    request.account_id = Some(owner.account_id);
    request.start_time = Utc::now().naive_utc() + Duration::hours(72);
    request.end_time = request.start_time + Duration::hours(2);
    let event_id = coordinator
        .create_booking(request)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    let update = UpdateBookingRequest {
        name: Some("Hijacked".to_string()),
        ..Default::default()
    };
    let response = coordinator
        .update_booking(
            event_id,
            update.clone(),
            Some(Actor::new(stranger.account_id, AccountRole::Customer)),
        )
        .await;
    assert!(!response.success);
    assert!(response.errors[0].contains("own bookings"));

    // Privileged actors bypass both ownership and lead time
    let response = coordinator
        .update_booking(
            event_id,
            update,
            Some(Actor::new(admin.account_id, AccountRole::Admin)),
        )
        .await;
    assert!(response.success, "errors: {:?}", response.errors);

    Ok(())
}

#[sqlx::test]
async fn test_update_excludes_own_booking_from_conflict(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let room = create_room(&pool, dec!(0), dec!(0)).await;

    let mut request = booking_request("Rehearsal");
    request.room_id = Some(room.room_id);
    request.duration_hours = Some(dec!(2));
    request.status = Some("CONFIRMED".to_string());
    let event_id = coordinator
        .create_booking(request)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    // Shift by 30 minutes; still overlapping its own prior window
    let update = UpdateBookingRequest {
        start_time: Some(at((2026, 9, 1), 10, 30)),
        end_time: Some(at((2026, 9, 1), 12, 30)),
        ..Default::default()
    };
    let response = coordinator.update_booking(event_id, update, None).await;
    assert!(response.success, "errors: {:?}", response.errors);

    Ok(())
}

#[sqlx::test]
async fn test_empty_line_list_means_no_change(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(25), true).await;

    let mut request = booking_request("Catered lunch");
    request.service_lines = vec![service_line(service.service_id, Some(variation.variation_id))];
    let event_id = coordinator
        .create_booking(request)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    let update = UpdateBookingRequest {
        description: Some("still catered".to_string()),
        ..Default::default()
    };
    let response = coordinator.update_booking(event_id, update, None).await;
    assert!(response.success, "errors: {:?}", response.errors);

    let lines = EventService::list_for_event(&pool, event_id).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].service_id, service.service_id);

    Ok(())
}

#[sqlx::test]
async fn test_nonempty_line_list_replaces_wholesale(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let catering = create_service(&pool, true).await;
    let catering_var = create_variation(&pool, catering.service_id, dec!(25), true).await;
    let security = create_service(&pool, true).await;
    let security_var = create_variation(&pool, security.service_id, dec!(40), true).await;

    let mut request = booking_request("Conference");
    request.service_lines = vec![
        service_line(catering.service_id, Some(catering_var.variation_id)),
        service_line(catering.service_id, Some(catering_var.variation_id)),
    ];
    let event_id = coordinator
        .create_booking(request)
        .await
        .data
        .unwrap()
        .event
        .event_id;

    let update = UpdateBookingRequest {
        service_lines: vec![service_line(security.service_id, Some(security_var.variation_id))],
        ..Default::default()
    };
    let response = coordinator.update_booking(event_id, update, None).await;
    assert!(response.success, "errors: {:?}", response.errors);

    let lines = EventService::list_for_event(&pool, event_id).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].service_id, security.service_id);

    Ok(())
}

#[sqlx::test]
async fn test_invoice_regenerated_when_cost_changes(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(50), true).await;

    let mut request = booking_request("Banquet");
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.quantity = Some(2);
    request.service_lines = vec![line];
    let record = coordinator.create_booking(request).await.data.unwrap();
    let invoice = record.invoice.unwrap();
    assert_eq!(invoice.total_amount, dec!(100));

    // Bump quantity: cost moves, details regenerate
    let mut line = service_line(service.service_id, Some(variation.variation_id));
    line.quantity = Some(4);
    let update = UpdateBookingRequest {
        service_lines: vec![line],
        ..Default::default()
    };
    let response = coordinator
        .update_booking(record.event.event_id, update, None)
        .await;
    assert!(response.success, "errors: {:?}", response.errors);

    let updated_invoice = Invoice::find_by_event_id(&pool, record.event.event_id)
        .await?
        .unwrap();
    assert_eq!(updated_invoice.total_amount, dec!(200));

    let details = InvoiceDetail::list_for_invoice(&pool, updated_invoice.invoice_id).await?;
    let detail_sum: Decimal = details.iter().map(|d| d.subtotal).sum();
    assert_eq!(detail_sum, dec!(200));

    Ok(())
}

#[sqlx::test]
async fn test_cost_neutral_update_leaves_invoice_untouched(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let service = create_service(&pool, true).await;
    let variation = create_variation(&pool, service.service_id, dec!(50), true).await;
    let other_service = create_service(&pool, true).await;
    let other_variation = create_variation(&pool, other_service.service_id, dec!(50), true).await;

    let mut request = booking_request("Seminar");
    request.service_lines = vec![service_line(service.service_id, Some(variation.variation_id))];
    let record = coordinator.create_booking(request).await.data.unwrap();
    let invoice = record.invoice.unwrap();
    let original_details = InvoiceDetail::list_for_invoice(&pool, invoice.invoice_id).await?;

    // Swap for a different line with the same price: total does not move, so
    // the invoice details are deliberately left as they were.
    let update = UpdateBookingRequest {
        service_lines: vec![service_line(
            other_service.service_id,
            Some(other_variation.variation_id),
        )],
        ..Default::default()
    };
    let response = coordinator
        .update_booking(record.event.event_id, update, None)
        .await;
    assert!(response.success, "errors: {:?}", response.errors);

    let lines = EventService::list_for_event(&pool, record.event.event_id).await?;
    assert_eq!(lines[0].service_id, other_service.service_id);

    let details_after = InvoiceDetail::list_for_invoice(&pool, invoice.invoice_id).await?;
    assert_eq!(details_after, original_details);

    Ok(())
}

#[sqlx::test]
async fn test_update_unknown_event_is_not_found(pool: PgPool) -> sqlx::Result<()> {
    let coordinator = BookingCoordinator::new(pool.clone());
    let response = coordinator
        .update_booking(424242, UpdateBookingRequest::default(), None)
        .await;
    assert!(!response.success);
    assert!(response.errors[0].contains("not found"));
    Ok(())
}

struct CountingNotifier {
    delivered: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, _: i64, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[sqlx::test]
async fn test_confirmation_sent_for_account_bookings(pool: PgPool) -> sqlx::Result<()> {
    let delivered = Arc::new(AtomicUsize::new(0));
    let coordinator = BookingCoordinator::with_notifier(
        pool.clone(),
        Arc::new(CountingNotifier {
            delivered: Arc::clone(&delivered),
        }),
    );
    let account = create_account(&pool, "CUSTOMER").await;

    // No account attached: no signal
    assert!(coordinator.create_booking(booking_request("Anonymous")).await.success);

    let mut request = booking_request("Owned");
    request.account_id = Some(account.account_id);
    assert!(coordinator.create_booking(request).await.success);

    // The signal is fire-and-forget on a spawned task; give it a moment
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(delivered.load(Ordering::SeqCst), 1);

    Ok(())
}

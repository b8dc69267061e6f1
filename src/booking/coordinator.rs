//! # Booking Coordinator
//!
//! Orchestrates one atomic unit of work per booking write: field validation,
//! reference checks, availability checks (under resource advisory locks), cost
//! computation, then persistence of the event, its service lines, and the
//! synthesized invoice. Any failed step aborts the whole transaction; no
//! partial writes are ever observable.
//!
//! The booking-confirmation signal to the external notifier is fired after
//! commit and never affects the transaction's outcome.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument, warn};

use crate::availability::{check_room_availability, check_variation_availability};
use crate::booking::requests::{
    Actor, CreateBookingRequest, ServiceLineRequest, UpdateBookingRequest,
};
use crate::constants::{system, EventServiceStatus, EventStatus};
use crate::error::BookingError;
use crate::models::{
    Account, Event, EventChanges, EventService, EventType, Invoice, InvoiceDetail, NewEvent,
    NewEventService, NewInvoice, NewInvoiceDetail, Room, Variation,
};
use crate::notifier::{LoggingNotifier, Notifier};
use crate::pricing::{self, InvoiceItem, PricedLine};
use crate::response::ServiceResponse;
use crate::validation;

/// A booking write's full result: the event with its owned records as they
/// stand after the transaction committed.
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub event: Event,
    pub service_lines: Vec<EventService>,
    pub invoice: Option<Invoice>,
}

/// A requested service line resolved against the service/variation directory.
struct ResolvedLine {
    request: ServiceLineRequest,
    priced: PricedLine,
}

#[derive(Clone)]
pub struct BookingCoordinator {
    pool: PgPool,
    notifier: Arc<dyn Notifier>,
}

impl BookingCoordinator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            notifier: Arc::new(LoggingNotifier),
        }
    }

    pub fn with_notifier(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Create a booking; one atomic transaction covering the event, its
    /// service lines, and the synthesized invoice.
    #[instrument(skip(self, request), fields(event_name = %request.name))]
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> ServiceResponse<BookingRecord> {
        match self.create_booking_inner(request).await {
            Ok(record) => {
                info!(event_id = record.event.event_id, "Booking created");
                self.send_confirmation(&record);
                ServiceResponse::ok(record)
            }
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    /// Update a booking; same atomicity guarantees as creation, plus the
    /// ownership/lead-time policy for non-privileged actors.
    #[instrument(skip(self, request))]
    pub async fn update_booking(
        &self,
        event_id: i64,
        request: UpdateBookingRequest,
        actor: Option<Actor>,
    ) -> ServiceResponse<BookingRecord> {
        match self.update_booking_inner(event_id, request, actor).await {
            Ok(record) => {
                info!(event_id = record.event.event_id, "Booking updated");
                ServiceResponse::ok(record)
            }
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn create_booking_inner(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingRecord, BookingError> {
        let mut errors = validation::validate_create_booking(&request);
        for (position, line) in request.service_lines.iter().enumerate() {
            errors.extend(validation::validate_service_line(line, position));
        }
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        let mut tx = self.pool.begin().await?;

        let (_account, room, _event_type) = resolve_references(
            &mut tx,
            request.account_id,
            request.room_id,
            request.event_type_id,
        )
        .await?;

        let duration = request
            .duration_hours
            .unwrap_or_else(|| derive_duration(request.start_time, request.end_time));

        if let Some(ref room) = room {
            ensure_room_window_free(&mut tx, room, request.start_time, duration, None).await?;
        }

        let resolved = resolve_service_lines(&mut tx, &request.service_lines).await?;
        let priced: Vec<PricedLine> = resolved.iter().map(|r| r.priced.clone()).collect();

        let base_override = request.estimated_cost.unwrap_or(Decimal::ZERO);
        let total = pricing::compute_total_cost(
            base_override,
            room.as_ref().map(Room::pricing).as_ref(),
            Some(duration),
            &priced,
        );

        let status = request
            .status
            .as_deref()
            .unwrap_or(EventStatus::Pending.as_str())
            .to_string();

        let event = Event::create_in_tx(
            &mut tx,
            NewEvent {
                name: request.name,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                event_date: request.event_date,
                estimated_cost: total,
                final_cost: request.final_cost,
                room_service_fee: request.room_service_fee,
                status,
                account_id: request.account_id,
                room_id: request.room_id,
                event_type_id: request.event_type_id,
                duration_hours: request.duration_hours,
            },
        )
        .await?;
        debug!(event_id = event.event_id, "Created event record");

        let mut service_lines = Vec::with_capacity(resolved.len());
        for line in &resolved {
            service_lines
                .push(insert_service_line(&mut tx, event.event_id, &line.request).await?);
        }

        let invoice = if total > Decimal::ZERO {
            let items = pricing::build_invoice_items(
                base_override,
                room.as_ref().map(|r| (r.name.as_str(), r.pricing())),
                Some(duration),
                &priced,
            );
            Some(synthesize_invoice(&mut tx, &event, total, &items).await?)
        } else {
            None
        };

        tx.commit().await?;

        Ok(BookingRecord {
            event,
            service_lines,
            invoice,
        })
    }

    async fn update_booking_inner(
        &self,
        event_id: i64,
        request: UpdateBookingRequest,
        actor: Option<Actor>,
    ) -> Result<BookingRecord, BookingError> {
        let mut errors = validation::validate_update_booking(&request);
        for (position, line) in request.service_lines.iter().enumerate() {
            errors.extend(validation::validate_service_line(line, position));
        }
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        let mut tx = self.pool.begin().await?;

        let existing = Event::find_by_id_in_tx(&mut tx, event_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("event {event_id} not found")))?;

        enforce_update_policy(&existing, actor)?;

        // Room resolution happens below since the effective room may come
        // from the stored event rather than the payload.
        resolve_references(&mut tx, request.account_id, None, request.event_type_id).await?;

        // Merged schedule the update would leave in place.
        let start_time = request.start_time.unwrap_or(existing.start_time);
        let end_time = request.end_time.unwrap_or(existing.end_time);
        if start_time >= end_time {
            return Err(BookingError::Validation(vec![
                "start_time must precede end_time".to_string(),
            ]));
        }
        let duration = request
            .duration_hours
            .or(existing.duration_hours)
            .unwrap_or_else(|| derive_duration(start_time, end_time));

        let effective_room_id = request.room_id.or(existing.room_id);
        let room = match effective_room_id {
            Some(room_id) => {
                let room = Room::find_by_id_in_tx(&mut tx, room_id)
                    .await?
                    .ok_or_else(|| {
                        BookingError::Reference(format!("room {room_id} not found"))
                    })?;
                if request.room_id.is_some() && !room.is_active {
                    return Err(BookingError::Reference(format!(
                        "room {room_id} is inactive"
                    )));
                }
                Some(room)
            }
            None => None,
        };

        // Re-check the window when the room changed or the schedule moved on
        // an unchanged room; the event's own prior booking never conflicts
        // with itself.
        let room_changed = request.room_id.is_some() && request.room_id != existing.room_id;
        if let Some(ref room) = room {
            if room_changed || request.touches_schedule() {
                ensure_room_window_free(&mut tx, room, start_time, duration, Some(event_id))
                    .await?;
            }
        }

        // Empty input list means "no change" for the line set.
        let replacing_lines = !request.service_lines.is_empty();

        // Cost is recomputed only when the request touches something the
        // total depends on; otherwise the stored cost and invoice stand.
        let recompute_cost = room_changed
            || request.touches_schedule()
            || replacing_lines
            || request.estimated_cost.is_some();

        let resolved_new = if replacing_lines {
            resolve_service_lines(&mut tx, &request.service_lines).await?
        } else {
            Vec::new()
        };

        let priced: Vec<PricedLine> = if !recompute_cost {
            Vec::new()
        } else if replacing_lines {
            resolved_new.iter().map(|r| r.priced.clone()).collect()
        } else {
            let stored = EventService::list_for_event_in_tx(&mut tx, event_id).await?;
            price_stored_lines(&mut tx, &stored).await?
        };

        let previous_cost = existing.estimated_cost;
        let base_override = request.estimated_cost.unwrap_or(Decimal::ZERO);
        let total = if recompute_cost {
            pricing::compute_total_cost(
                base_override,
                room.as_ref().map(Room::pricing).as_ref(),
                Some(duration),
                &priced,
            )
        } else {
            previous_cost
        };

        let event = Event::update_in_tx(
            &mut tx,
            event_id,
            EventChanges {
                name: request.name,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                event_date: request.event_date,
                estimated_cost: recompute_cost.then_some(total),
                final_cost: request.final_cost,
                room_service_fee: request.room_service_fee,
                status: request.status,
                account_id: request.account_id,
                room_id: request.room_id,
                event_type_id: request.event_type_id,
                duration_hours: request.duration_hours,
            },
        )
        .await?;

        let service_lines = if replacing_lines {
            // Wholesale replace: drop the prior set, insert the new one.
            EventService::delete_for_event_in_tx(&mut tx, event_id).await?;
            let mut inserted = Vec::with_capacity(resolved_new.len());
            for line in &resolved_new {
                inserted.push(insert_service_line(&mut tx, event_id, &line.request).await?);
            }
            inserted
        } else {
            EventService::list_for_event_in_tx(&mut tx, event_id).await?
        };

        // Invoice resync only when the computed total moved. A cost-neutral
        // composition change leaves the detail lines stale; that matches the
        // long-standing observed behavior and is covered by tests.
        let invoice = if total != previous_cost {
            let items = pricing::build_invoice_items(
                base_override,
                room.as_ref().map(|r| (r.name.as_str(), r.pricing())),
                Some(duration),
                &priced,
            );
            match Invoice::find_by_event_id_in_tx(&mut tx, event_id).await? {
                Some(stale) => {
                    InvoiceDetail::delete_for_invoice_in_tx(&mut tx, stale.invoice_id).await?;
                    for item in &items {
                        insert_invoice_item(&mut tx, stale.invoice_id, item).await?;
                    }
                    Some(Invoice::update_total_in_tx(&mut tx, stale.invoice_id, total).await?)
                }
                None if total > Decimal::ZERO => {
                    Some(synthesize_invoice(&mut tx, &event, total, &items).await?)
                }
                None => None,
            }
        } else {
            Invoice::find_by_event_id_in_tx(&mut tx, event_id).await?
        };

        tx.commit().await?;

        Ok(BookingRecord {
            event,
            service_lines,
            invoice,
        })
    }

    /// Fire-and-forget confirmation signal; failures are logged, never raised.
    fn send_confirmation(&self, record: &BookingRecord) {
        let Some(account_id) = record.event.account_id else {
            return;
        };
        let notifier = Arc::clone(&self.notifier);
        let event_name = record.event.name.clone();
        tokio::spawn(async move {
            let message = format!("Your booking '{event_name}' has been received");
            if let Err(err) = notifier
                .notify(account_id, "Booking received", &message, "BOOKING_CONFIRMATION")
                .await
            {
                warn!(account_id = account_id, error = %err, "Booking notification failed");
            }
        });
    }
}

/// Duration in fractional hours between two timestamps.
fn derive_duration(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    Decimal::from((end - start).num_minutes()) / Decimal::from(60)
}

/// Ownership and lead-time policy for updates. Privileged and internal
/// callers bypass it.
fn enforce_update_policy(event: &Event, actor: Option<Actor>) -> Result<(), BookingError> {
    let Some(actor) = actor else { return Ok(()) };
    if actor.is_privileged() {
        return Ok(());
    }

    if event.account_id != Some(actor.account_id) {
        return Err(BookingError::Policy(
            "you may only modify your own bookings".to_string(),
        ));
    }

    let hours_until_start = (event.start_time - Utc::now().naive_utc()).num_hours();
    if hours_until_start < system::MIN_UPDATE_LEAD_TIME_HOURS {
        return Err(BookingError::Policy(format!(
            "bookings may only be modified at least {} hours before their start time",
            system::MIN_UPDATE_LEAD_TIME_HOURS
        )));
    }

    Ok(())
}

/// Resolve the optional foreign references; each supplied id must exist and,
/// for rooms and event types, be active.
async fn resolve_references(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Option<i64>,
    room_id: Option<i64>,
    event_type_id: Option<i64>,
) -> Result<(Option<Account>, Option<Room>, Option<EventType>), BookingError> {
    let account = match account_id {
        Some(id) => Some(
            Account::find_by_id_in_tx(tx, id)
                .await?
                .ok_or_else(|| BookingError::Reference(format!("account {id} not found")))?,
        ),
        None => None,
    };

    let room = match room_id {
        Some(id) => {
            let room = Room::find_by_id_in_tx(tx, id)
                .await?
                .ok_or_else(|| BookingError::Reference(format!("room {id} not found")))?;
            if !room.is_active {
                return Err(BookingError::Reference(format!("room {id} is inactive")));
            }
            Some(room)
        }
        None => None,
    };

    let event_type = match event_type_id {
        Some(id) => {
            let event_type = EventType::find_by_id_in_tx(tx, id)
                .await?
                .ok_or_else(|| BookingError::Reference(format!("event type {id} not found")))?;
            if !event_type.is_active {
                return Err(BookingError::Reference(format!(
                    "event type {id} is inactive"
                )));
            }
            Some(event_type)
        }
        None => None,
    };

    Ok((account, room, event_type))
}

/// Room must be bookable and the window free of confirmed bookings.
async fn ensure_room_window_free(
    tx: &mut Transaction<'_, Postgres>,
    room: &Room,
    start: NaiveDateTime,
    duration_hours: Decimal,
    exclude_event_id: Option<i64>,
) -> Result<(), BookingError> {
    let availability =
        check_room_availability(tx, room.room_id, start, duration_hours, exclude_event_id)
            .await?;
    if !availability.available {
        return Err(BookingError::Conflict {
            reason: availability
                .reason
                .unwrap_or_else(|| format!("room {} is not available", room.room_id)),
            conflicts: availability.conflicts,
        });
    }
    Ok(())
}

/// Resolve each requested line to a priced line: the service must exist and
/// be active, a supplied variation must exist and be active, and the unit
/// price is the custom override or the variation's base price. Lines carrying
/// their own schedule get a fresh variation-level availability pass.
async fn resolve_service_lines(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[ServiceLineRequest],
) -> Result<Vec<ResolvedLine>, BookingError> {
    let mut resolved = Vec::with_capacity(lines.len());

    for (position, line) in lines.iter().enumerate() {
        let service = crate::models::Service::find_by_id_in_tx(tx, line.service_id)
            .await?
            .ok_or_else(|| {
                BookingError::Reference(format!(
                    "service_lines[{position}]: service {} not found",
                    line.service_id
                ))
            })?;
        if !service.is_active {
            return Err(BookingError::Reference(format!(
                "service_lines[{position}]: service {} is inactive",
                line.service_id
            )));
        }

        let variation = match line.variation_id {
            Some(variation_id) => {
                let variation = Variation::find_by_id_in_tx(tx, variation_id)
                    .await?
                    .ok_or_else(|| {
                        BookingError::Reference(format!(
                            "service_lines[{position}]: variation {variation_id} not found"
                        ))
                    })?;
                if !variation.is_active {
                    return Err(BookingError::Reference(format!(
                        "service_lines[{position}]: variation {variation_id} is inactive"
                    )));
                }
                Some(variation)
            }
            None => None,
        };

        let unit_price = match (line.custom_price, &variation) {
            (Some(custom), _) => custom,
            (None, Some(variation)) => variation.base_price,
            (None, None) => {
                return Err(BookingError::Reference(format!(
                    "service_lines[{position}]: either a variation or a custom price is required"
                )))
            }
        };

        // Service-level conflicts are always checked fresh; nothing excluded.
        if let (Some(scheduled), Some(ref variation)) = (line.scheduled_time, &variation) {
            let line_duration = line.duration_hours.unwrap_or(Decimal::ZERO);
            let availability = check_variation_availability(
                tx,
                variation.variation_id,
                scheduled,
                line_duration,
            )
            .await?;
            if !availability.available {
                return Err(BookingError::Conflict {
                    reason: availability.reason.unwrap_or_else(|| {
                        format!(
                            "service_lines[{position}]: variation {} is not available",
                            variation.variation_id
                        )
                    }),
                    conflicts: availability.conflicts,
                });
            }
        }

        let item_name = variation
            .as_ref()
            .map(|v| format!("{} - {}", service.name, v.name))
            .unwrap_or_else(|| service.name.clone());

        resolved.push(ResolvedLine {
            request: line.clone(),
            priced: PricedLine {
                item_name,
                service_id: line.service_id,
                variation_id: line.variation_id,
                quantity: line.quantity.unwrap_or(1),
                unit_price,
            },
        });
    }

    Ok(resolved)
}

/// Price the stored line set for a cost recomputation that does not replace
/// the lines (update with an empty input list).
async fn price_stored_lines(
    tx: &mut Transaction<'_, Postgres>,
    stored: &[EventService],
) -> Result<Vec<PricedLine>, BookingError> {
    let mut priced = Vec::with_capacity(stored.len());

    for line in stored {
        let variation = match line.variation_id {
            Some(variation_id) => Variation::find_by_id_in_tx(tx, variation_id).await?,
            None => None,
        };
        let unit_price = pricing::line_unit_price(
            line.custom_price,
            variation
                .as_ref()
                .map(|v| v.base_price)
                .unwrap_or(Decimal::ZERO),
        );
        let service = crate::models::Service::find_by_id_in_tx(tx, line.service_id).await?;
        let service_name = service
            .map(|s| s.name)
            .unwrap_or_else(|| format!("service {}", line.service_id));
        let item_name = variation
            .as_ref()
            .map(|v| format!("{service_name} - {}", v.name))
            .unwrap_or(service_name);

        priced.push(PricedLine {
            item_name,
            service_id: line.service_id,
            variation_id: line.variation_id,
            quantity: line.quantity,
            unit_price,
        });
    }

    Ok(priced)
}

async fn insert_service_line(
    tx: &mut Transaction<'_, Postgres>,
    event_id: i64,
    line: &ServiceLineRequest,
) -> Result<EventService, BookingError> {
    let status = line
        .status
        .as_deref()
        .unwrap_or(EventServiceStatus::Confirmed.as_str())
        .to_string();

    Ok(EventService::create_in_tx(
        tx,
        NewEventService {
            event_id,
            service_id: line.service_id,
            variation_id: line.variation_id,
            quantity: line.quantity.unwrap_or(1),
            custom_price: line.custom_price,
            notes: line.notes.clone(),
            status,
            scheduled_time: line.scheduled_time,
            duration_hours: line.duration_hours,
        },
    )
    .await?)
}

async fn insert_invoice_item(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: i64,
    item: &InvoiceItem,
) -> Result<InvoiceDetail, BookingError> {
    Ok(InvoiceDetail::create_in_tx(
        tx,
        NewInvoiceDetail {
            invoice_id,
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            item_type: item.item_type.as_str().to_string(),
            service_id: item.service_id,
            variation_id: item.variation_id,
        },
    )
    .await?)
}

/// Create an invoice for the event and one detail line per priced component.
async fn synthesize_invoice(
    tx: &mut Transaction<'_, Postgres>,
    event: &Event,
    total: Decimal,
    items: &[InvoiceItem],
) -> Result<Invoice, BookingError> {
    let invoice = Invoice::create_in_tx(
        tx,
        NewInvoice {
            total_amount: total,
            event_id: event.event_id,
            account_id: event.account_id,
        },
    )
    .await?;

    for item in items {
        insert_invoice_item(tx, invoice.invoice_id, item).await?;
    }

    Ok(invoice)
}

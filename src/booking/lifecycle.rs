//! # Lifecycle Manager
//!
//! Status toggling and deletion-safety rules for existing bookings. Deletion
//! is guarded: dependents (service lines, invoice and its details, payments,
//! reviews) block it unless the caller forces a cascade, which then removes
//! everything inside one transaction.

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::constants::EventStatus;
use crate::error::BookingError;
use crate::models::{
    DependencyCounts, Event, EventService, Invoice, InvoiceDetail, Payment, Review,
};
use crate::response::ServiceResponse;

/// Result of a successful deletion: what was removed alongside the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DeletionReport {
    pub event_id: i64,
    pub removed: DependencyCounts,
}

#[derive(Clone)]
pub struct LifecycleManager {
    pool: PgPool,
}

impl LifecycleManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Binary status flip: PENDING becomes CONFIRMED, anything else becomes
    /// PENDING. Applying it twice returns the booking to where it started
    /// (from either of those two states).
    #[instrument(skip(self))]
    pub async fn toggle_status(&self, event_id: i64) -> ServiceResponse<Event> {
        match self.toggle_status_inner(event_id).await {
            Ok(event) => {
                info!(event_id = event.event_id, status = %event.status, "Booking status toggled");
                ServiceResponse::ok(event)
            }
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn toggle_status_inner(&self, event_id: i64) -> Result<Event, BookingError> {
        let event = Event::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("event {event_id} not found")))?;

        let next = if event.status == EventStatus::Pending.as_str() {
            EventStatus::Confirmed
        } else {
            EventStatus::Pending
        };

        Event::set_status(&self.pool, event_id, next.as_str())
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("event {event_id} not found")))
    }

    /// Delete a booking. Without `force`, any dependent record blocks the
    /// deletion and the error reports the exact counts; with `force`, all
    /// dependents are removed in the same transaction before the event.
    #[instrument(skip(self))]
    pub async fn delete_booking(
        &self,
        event_id: i64,
        force: bool,
    ) -> ServiceResponse<DeletionReport> {
        match self.delete_booking_inner(event_id, force).await {
            Ok(report) => {
                info!(event_id = report.event_id, "Booking deleted");
                ServiceResponse::ok(report)
            }
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn delete_booking_inner(
        &self,
        event_id: i64,
        force: bool,
    ) -> Result<DeletionReport, BookingError> {
        let mut tx = self.pool.begin().await?;

        let event = Event::find_by_id_in_tx(&mut tx, event_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("event {event_id} not found")))?;

        // Counted inside the deleting transaction; the guard decision and the
        // report cover exactly the rows the cascade removes.
        let counts = Event::dependent_counts_in_tx(&mut tx, event.event_id).await?;
        if counts.total() > 0 && !force {
            return Err(BookingError::Dependency(format!(
                "event {event_id} has dependent records ({counts}); pass force to delete them"
            )));
        }

        if let Some(invoice) = Invoice::find_by_event_id_in_tx(&mut tx, event_id).await? {
            InvoiceDetail::delete_for_invoice_in_tx(&mut tx, invoice.invoice_id).await?;
            Invoice::delete_in_tx(&mut tx, invoice.invoice_id).await?;
        }
        EventService::delete_for_event_in_tx(&mut tx, event_id).await?;
        Payment::delete_for_event_in_tx(&mut tx, event_id).await?;
        Review::delete_for_event_in_tx(&mut tx, event_id).await?;

        if !Event::delete_in_tx(&mut tx, event_id).await? {
            return Err(BookingError::NotFound(format!("event {event_id} not found")));
        }

        tx.commit().await?;

        Ok(DeletionReport {
            event_id,
            removed: counts,
        })
    }
}

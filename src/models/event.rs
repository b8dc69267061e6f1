//! # Event Model
//!
//! The booking record itself. An event owns zero-or-more service lines and at
//! most one invoice; its `status` string is drawn from
//! [`EventStatus`](crate::constants::EventStatus) and only CONFIRMED events
//! hold their room against other bookings.
//!
//! Maps to the `events` table. All writes that participate in a coordinated
//! booking go through the `_in_tx` variants so the whole unit of work shares
//! one transaction.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::fmt;

const EVENT_COLUMNS: &str = "event_id, name, description, start_time, end_time, event_date, \
     estimated_cost, final_cost, room_service_fee, status, account_id, room_id, \
     event_type_id, duration_hours, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub event_date: Option<NaiveDate>,
    pub estimated_cost: Decimal,
    pub final_cost: Option<Decimal>,
    pub room_service_fee: Option<Decimal>,
    pub status: String,
    pub account_id: Option<i64>,
    pub room_id: Option<i64>,
    pub event_type_id: Option<i64>,
    pub duration_hours: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// New Event for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub event_date: Option<NaiveDate>,
    pub estimated_cost: Decimal,
    pub final_cost: Option<Decimal>,
    pub room_service_fee: Option<Decimal>,
    pub status: String,
    pub account_id: Option<i64>,
    pub room_id: Option<i64>,
    pub event_type_id: Option<i64>,
    pub duration_hours: Option<Decimal>,
}

/// Partial field changes for an update. Absent fields keep their stored value
/// (COALESCE at the SQL level), they are never nulled.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub event_date: Option<NaiveDate>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub room_service_fee: Option<Decimal>,
    pub status: Option<String>,
    pub account_id: Option<i64>,
    pub room_id: Option<i64>,
    pub event_type_id: Option<i64>,
    pub duration_hours: Option<Decimal>,
}

/// Counts of records that depend on an event, used by the deletion guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyCounts {
    pub service_lines: i64,
    pub invoices: i64,
    pub invoice_details: i64,
    pub payments: i64,
    pub reviews: i64,
}

impl DependencyCounts {
    pub fn total(&self) -> i64 {
        self.service_lines + self.invoices + self.invoice_details + self.payments + self.reviews
    }
}

impl fmt::Display for DependencyCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} service line(s), {} invoice(s), {} invoice detail(s), {} payment(s), {} review(s)",
            self.service_lines, self.invoices, self.invoice_details, self.payments, self.reviews
        )
    }
}

impl Event {
    /// Create a new event within an open transaction
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        new_event: NewEvent,
    ) -> Result<Event, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                name, description, start_time, end_time, event_date, estimated_cost,
                final_cost, room_service_fee, status, account_id, room_id,
                event_type_id, duration_hours, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&new_event.name)
        .bind(&new_event.description)
        .bind(new_event.start_time)
        .bind(new_event.end_time)
        .bind(new_event.event_date)
        .bind(new_event.estimated_cost)
        .bind(new_event.final_cost)
        .bind(new_event.room_service_fee)
        .bind(&new_event.status)
        .bind(new_event.account_id)
        .bind(new_event.room_id)
        .bind(new_event.event_type_id)
        .bind(new_event.duration_hours)
        .fetch_one(&mut **tx)
        .await?;

        Ok(event)
    }

    pub async fn find_by_id(pool: &PgPool, event_id: i64) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1"
        ))
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1"
        ))
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Apply partial changes; untouched fields keep their stored value.
    pub async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        changes: EventChanges,
    ) -> Result<Event, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                event_date = COALESCE($6, event_date),
                estimated_cost = COALESCE($7, estimated_cost),
                final_cost = COALESCE($8, final_cost),
                room_service_fee = COALESCE($9, room_service_fee),
                status = COALESCE($10, status),
                account_id = COALESCE($11, account_id),
                room_id = COALESCE($12, room_id),
                event_type_id = COALESCE($13, event_type_id),
                duration_hours = COALESCE($14, duration_hours),
                updated_at = NOW()
            WHERE event_id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.event_date)
        .bind(changes.estimated_cost)
        .bind(changes.final_cost)
        .bind(changes.room_service_fee)
        .bind(changes.status)
        .bind(changes.account_id)
        .bind(changes.room_id)
        .bind(changes.event_type_id)
        .bind(changes.duration_hours)
        .fetch_one(&mut **tx)
        .await?;

        Ok(event)
    }

    /// Overwrite only the status field.
    pub async fn set_status(
        pool: &PgPool,
        event_id: i64,
        status: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events SET status = $2, updated_at = NOW()
            WHERE event_id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count everything that hangs off this event, for the deletion guard.
    /// Runs in the deleting transaction so the guard and the reported counts
    /// see exactly the rows the cascade will remove.
    pub async fn dependent_counts_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<DependencyCounts, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM event_services WHERE event_id = $1),
                (SELECT COUNT(*) FROM invoices WHERE event_id = $1),
                (SELECT COUNT(*) FROM invoice_details d
                    INNER JOIN invoices i ON i.invoice_id = d.invoice_id
                    WHERE i.event_id = $1),
                (SELECT COUNT(*) FROM payments WHERE event_id = $1),
                (SELECT COUNT(*) FROM reviews WHERE event_id = $1)
            "#,
        )
        .bind(event_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(DependencyCounts {
            service_lines: row.0,
            invoices: row.1,
            invoice_details: row.2,
            payments: row.3,
            reviews: row.4,
        })
    }

    /// Duration used for conflict math: the stored duration when present,
    /// otherwise derived from the start/end pair.
    pub fn effective_duration_hours(&self) -> Decimal {
        match self.duration_hours {
            Some(hours) => hours,
            None => {
                let minutes = (self.end_time - self.start_time).num_minutes();
                Decimal::from(minutes) / Decimal::from(60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_event(duration_hours: Option<Decimal>) -> Event {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        Event {
            event_id: 1,
            name: "Workshop".to_string(),
            description: None,
            start_time: date.and_hms_opt(10, 0, 0).unwrap(),
            end_time: date.and_hms_opt(13, 30, 0).unwrap(),
            event_date: Some(date),
            estimated_cost: dec!(0),
            final_cost: None,
            room_service_fee: None,
            status: "PENDING".to_string(),
            account_id: None,
            room_id: None,
            event_type_id: None,
            duration_hours,
            created_at: date.and_hms_opt(0, 0, 0).unwrap(),
            updated_at: date.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_stored_duration_wins() {
        let event = sample_event(Some(dec!(2)));
        assert_eq!(event.effective_duration_hours(), dec!(2));
    }

    #[test]
    fn test_duration_derived_from_range() {
        let event = sample_event(None);
        assert_eq!(event.effective_duration_hours(), dec!(3.5));
    }

    #[test]
    fn test_dependency_counts_total_and_display() {
        let counts = DependencyCounts {
            service_lines: 2,
            invoices: 1,
            invoice_details: 3,
            payments: 0,
            reviews: 1,
        };
        assert_eq!(counts.total(), 7);
        let rendered = counts.to_string();
        assert!(rendered.contains("2 service line(s)"));
        assert!(rendered.contains("3 invoice detail(s)"));
    }
}

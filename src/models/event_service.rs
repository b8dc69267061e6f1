//! # EventService Model
//!
//! A service-variation attachment to an event (one "service line"). Lines are
//! fully owned by their event and replaced wholesale on update: the coordinator
//! deletes every existing line and inserts the newly supplied set rather than
//! diffing.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

const EVENT_SERVICE_COLUMNS: &str = "event_service_id, event_id, service_id, variation_id, \
     quantity, custom_price, notes, status, scheduled_time, duration_hours, created_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventService {
    pub event_service_id: i64,
    pub event_id: i64,
    pub service_id: i64,
    pub variation_id: Option<i64>,
    pub quantity: i32,
    pub custom_price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: String,
    pub scheduled_time: Option<NaiveDateTime>,
    pub duration_hours: Option<Decimal>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEventService {
    pub event_id: i64,
    pub service_id: i64,
    pub variation_id: Option<i64>,
    pub quantity: i32,
    pub custom_price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: String,
    pub scheduled_time: Option<NaiveDateTime>,
    pub duration_hours: Option<Decimal>,
}

impl EventService {
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        new_line: NewEventService,
    ) -> Result<EventService, sqlx::Error> {
        let line = sqlx::query_as::<_, EventService>(&format!(
            r#"
            INSERT INTO event_services (
                event_id, service_id, variation_id, quantity, custom_price,
                notes, status, scheduled_time, duration_hours, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {EVENT_SERVICE_COLUMNS}
            "#
        ))
        .bind(new_line.event_id)
        .bind(new_line.service_id)
        .bind(new_line.variation_id)
        .bind(new_line.quantity)
        .bind(new_line.custom_price)
        .bind(&new_line.notes)
        .bind(&new_line.status)
        .bind(new_line.scheduled_time)
        .bind(new_line.duration_hours)
        .fetch_one(&mut **tx)
        .await?;

        Ok(line)
    }

    pub async fn list_for_event(
        pool: &PgPool,
        event_id: i64,
    ) -> Result<Vec<EventService>, sqlx::Error> {
        sqlx::query_as::<_, EventService>(&format!(
            "SELECT {EVENT_SERVICE_COLUMNS} FROM event_services \
             WHERE event_id = $1 ORDER BY event_service_id"
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_event_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<Vec<EventService>, sqlx::Error> {
        sqlx::query_as::<_, EventService>(&format!(
            "SELECT {EVENT_SERVICE_COLUMNS} FROM event_services \
             WHERE event_id = $1 ORDER BY event_service_id"
        ))
        .bind(event_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Delete every line for an event; first half of the wholesale replace.
    pub async fn delete_for_event_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_services WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

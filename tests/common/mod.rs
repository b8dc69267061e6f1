//! Shared test factories: directory rows (accounts, rooms, event types,
//! services/variations) are inserted directly since the engine treats them as
//! read-only collaborators.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};

use venue_booking_core::booking::{CreateBookingRequest, ServiceLineRequest};
use venue_booking_core::models::{Account, EventType, Room, Service, Variation};

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique name for test data
pub fn unique_name(prefix: &str) -> String {
    let count = NAME_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{count}")
}

pub fn at(date: (i32, u32, u32), hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

pub async fn create_account(pool: &PgPool, role: &str) -> Account {
    sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (name, email, role) VALUES ($1, $2, $3) \
         RETURNING account_id, name, email, role",
    )
    .bind(unique_name("account"))
    .bind(format!("{}@example.com", unique_name("mail")))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("Failed to create test account")
}

pub async fn create_room(pool: &PgPool, base_price: Decimal, hourly_rate: Decimal) -> Room {
    create_room_with_status(pool, base_price, hourly_rate, true, "AVAILABLE").await
}

pub async fn create_room_with_status(
    pool: &PgPool,
    base_price: Decimal,
    hourly_rate: Decimal,
    is_active: bool,
    availability_status: &str,
) -> Room {
    sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (name, base_price, hourly_rate, is_active, availability_status) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING room_id, name, base_price, hourly_rate, is_active, availability_status, created_at",
    )
    .bind(unique_name("room"))
    .bind(base_price)
    .bind(hourly_rate)
    .bind(is_active)
    .bind(availability_status)
    .fetch_one(pool)
    .await
    .expect("Failed to create test room")
}

pub async fn create_event_type(pool: &PgPool, is_active: bool) -> EventType {
    sqlx::query_as::<_, EventType>(
        "INSERT INTO event_types (name, is_active) VALUES ($1, $2) \
         RETURNING event_type_id, name, is_active",
    )
    .bind(unique_name("event_type"))
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("Failed to create test event type")
}

pub async fn create_service(pool: &PgPool, is_active: bool) -> Service {
    sqlx::query_as::<_, Service>(
        "INSERT INTO services (name, is_active) VALUES ($1, $2) \
         RETURNING service_id, name, is_active",
    )
    .bind(unique_name("service"))
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("Failed to create test service")
}

pub async fn create_variation(
    pool: &PgPool,
    service_id: i64,
    base_price: Decimal,
    is_active: bool,
) -> Variation {
    sqlx::query_as::<_, Variation>(
        "INSERT INTO service_variations (service_id, name, base_price, is_active) \
         VALUES ($1, $2, $3, $4) \
         RETURNING variation_id, service_id, name, base_price, is_active",
    )
    .bind(service_id)
    .bind(unique_name("variation"))
    .bind(base_price)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("Failed to create test variation")
}

pub async fn insert_payment(pool: &PgPool, event_id: i64, amount: Decimal) {
    sqlx::query("INSERT INTO payments (event_id, amount, status) VALUES ($1, $2, 'PAID')")
        .bind(event_id)
        .bind(amount)
        .execute(pool)
        .await
        .expect("Failed to create test payment");
}

pub async fn insert_review(pool: &PgPool, event_id: i64, rating: i32) {
    sqlx::query("INSERT INTO reviews (event_id, rating, comment) VALUES ($1, $2, 'fine')")
        .bind(event_id)
        .bind(rating)
        .execute(pool)
        .await
        .expect("Failed to create test review");
}

/// Minimal valid create payload for a 10:00-12:00 booking on 2026-09-01.
pub fn booking_request(name: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        name: name.to_string(),
        description: None,
        start_time: at((2026, 9, 1), 10, 0),
        end_time: at((2026, 9, 1), 12, 0),
        event_date: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
        estimated_cost: None,
        final_cost: None,
        room_service_fee: None,
        account_id: None,
        room_id: None,
        event_type_id: None,
        status: None,
        duration_hours: None,
        service_lines: vec![],
    }
}

pub fn service_line(service_id: i64, variation_id: Option<i64>) -> ServiceLineRequest {
    ServiceLineRequest {
        service_id,
        variation_id,
        quantity: None,
        custom_price: None,
        notes: None,
        status: None,
        scheduled_time: None,
        duration_hours: None,
    }
}

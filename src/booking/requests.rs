//! Inbound payloads for the booking operations.
//!
//! These are the structures the excluded routing layer hands to the engine.
//! Identifier fields accept either JSON numbers or numeric strings; everything
//! optional stays `Option` so updates can be partial.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::AccountRole;
use crate::validation::coerce_id;

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => coerce_id(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a numeric id")),
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    coerce_id(&value).ok_or_else(|| serde::de::Error::custom("expected a numeric id"))
}

/// One requested service-variation attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLineRequest {
    #[serde(deserialize_with = "de_id")]
    pub service_id: i64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub variation_id: Option<i64>,
    pub quantity: Option<i32>,
    pub custom_price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub scheduled_time: Option<NaiveDateTime>,
    pub duration_hours: Option<Decimal>,
}

/// Payload for `create_booking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub event_date: Option<NaiveDate>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub room_service_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub account_id: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub event_type_id: Option<i64>,
    /// Defaults to PENDING when absent.
    pub status: Option<String>,
    pub duration_hours: Option<Decimal>,
    #[serde(default)]
    pub service_lines: Vec<ServiceLineRequest>,
}

/// Payload for `update_booking`; every field is optional and absent fields
/// leave the stored value untouched. An empty `service_lines` list means
/// "no change", not "clear all".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub event_date: Option<NaiveDate>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub room_service_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub account_id: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub event_type_id: Option<i64>,
    pub status: Option<String>,
    pub duration_hours: Option<Decimal>,
    #[serde(default)]
    pub service_lines: Vec<ServiceLineRequest>,
}

impl UpdateBookingRequest {
    /// Whether the proposed schedule (start or duration) is being touched.
    pub fn touches_schedule(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some() || self.duration_hours.is_some()
    }
}

/// The authenticated caller on behalf of whom an update runs. `None` actors
/// (internal callers) bypass ownership and lead-time policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub account_id: i64,
    pub role: AccountRole,
}

impl Actor {
    pub fn new(account_id: i64, role: AccountRole) -> Self {
        Self { account_id, role }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

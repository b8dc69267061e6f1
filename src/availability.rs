//! Time-conflict detection for bookable resources.
//!
//! A resource is either a room (event-level bookings) or a service variation
//! (line-level bookings). Both checks run inside the caller's open transaction
//! after taking a transaction-scoped advisory lock on the resource, so the
//! check-then-write sequence cannot race a concurrent booking for the same
//! resource (the lock is released automatically at commit/rollback).
//!
//! Overlap is strict on half-open intervals: two windows that merely touch at
//! an endpoint do not conflict.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};

use crate::constants::{system, EventServiceStatus, EventStatus, RoomAvailability};

/// One existing booking that overlaps a proposed window.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ConflictRecord {
    pub event_id: i64,
    pub event_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl ConflictRecord {
    pub fn describe(&self) -> String {
        format!(
            "conflicts with booking {} '{}' ({} - {})",
            self.event_id, self.event_name, self.start_time, self.end_time
        )
    }
}

/// Outcome of an availability check. Never an error for a bad or inactive
/// resource; those come back as a negative result with a reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<String>,
    pub conflicts: Vec<ConflictRecord>,
}

impl Availability {
    pub fn clear() -> Self {
        Self {
            available: true,
            reason: None,
            conflicts: Vec::new(),
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
            conflicts: Vec::new(),
        }
    }

    pub fn conflicted(conflicts: Vec<ConflictRecord>) -> Self {
        Self {
            available: false,
            reason: Some(format!(
                "requested window overlaps {} existing booking(s)",
                conflicts.len()
            )),
            conflicts,
        }
    }
}

/// Strict half-open interval overlap: touching endpoints do not conflict.
pub fn windows_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Convert fractional hours to a chrono duration (second precision).
pub fn hours_to_duration(hours: Decimal) -> Duration {
    let seconds = (hours * Decimal::from(3600)).to_i64().unwrap_or(0);
    Duration::seconds(seconds)
}

/// Take a transaction-scoped advisory lock for a resource. Combines the
/// keyspace and resource id into the single 64-bit advisory key.
pub async fn lock_resource(
    tx: &mut Transaction<'_, Postgres>,
    keyspace: i32,
    resource_id: i64,
) -> Result<(), sqlx::Error> {
    let key = ((keyspace as i64) << 32) ^ (resource_id & 0xFFFF_FFFF);
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct RoomCandidate {
    event_id: i64,
    name: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    duration_hours: Option<Decimal>,
}

impl RoomCandidate {
    /// Stored duration wins for conflict math; fall back to the stored end.
    fn effective_end(&self) -> NaiveDateTime {
        match self.duration_hours {
            Some(hours) => self.start_time + hours_to_duration(hours),
            None => self.end_time,
        }
    }
}

/// Check whether a room is free for the proposed window.
///
/// The room must exist, be active, and be in AVAILABLE status before the
/// interval test even runs; otherwise the check short-circuits negative.
/// `exclude_event_id` skips the booking being updated.
pub async fn check_room_availability(
    tx: &mut Transaction<'_, Postgres>,
    room_id: i64,
    proposed_start: NaiveDateTime,
    duration_hours: Decimal,
    exclude_event_id: Option<i64>,
) -> Result<Availability, sqlx::Error> {
    if room_id <= 0 {
        return Ok(Availability::blocked("invalid room id"));
    }

    lock_resource(tx, system::ROOM_LOCK_KEYSPACE, room_id).await?;

    let room = sqlx::query_as::<_, (bool, String)>(
        "SELECT is_active, availability_status FROM rooms WHERE room_id = $1",
    )
    .bind(room_id)
    .fetch_optional(&mut **tx)
    .await?;

    let (is_active, availability_status) = match room {
        Some(room) => room,
        None => return Ok(Availability::blocked(format!("room {room_id} not found"))),
    };
    if !is_active {
        return Ok(Availability::blocked(format!("room {room_id} is inactive")));
    }
    if availability_status != RoomAvailability::Available.as_str() {
        return Ok(Availability::blocked(format!(
            "room {room_id} is not available (status: {availability_status})"
        )));
    }

    let proposed_end = proposed_start + hours_to_duration(duration_hours);

    // Cheap pre-filter: confirmed bookings that start no later than the
    // proposed end. Exact overlap is decided per candidate below.
    let candidates = sqlx::query_as::<_, RoomCandidate>(
        r#"
        SELECT event_id, name, start_time, end_time, duration_hours
        FROM events
        WHERE room_id = $1
          AND status = $2
          AND start_time <= $3
          AND ($4::BIGINT IS NULL OR event_id <> $4)
        "#,
    )
    .bind(room_id)
    .bind(EventStatus::Confirmed.as_str())
    .bind(proposed_end)
    .bind(exclude_event_id)
    .fetch_all(&mut **tx)
    .await?;

    let conflicts: Vec<ConflictRecord> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate_end = candidate.effective_end();
            windows_overlap(proposed_start, proposed_end, candidate.start_time, candidate_end)
                .then(|| ConflictRecord {
                    event_id: candidate.event_id,
                    event_name: candidate.name,
                    start_time: candidate.start_time,
                    end_time: candidate_end,
                })
        })
        .collect();

    if conflicts.is_empty() {
        Ok(Availability::clear())
    } else {
        Ok(Availability::conflicted(conflicts))
    }
}

#[derive(Debug, FromRow)]
struct VariationCandidate {
    event_id: i64,
    event_name: String,
    scheduled_time: NaiveDateTime,
    duration_hours: Option<Decimal>,
}

/// Check whether a service variation is free for the proposed window.
///
/// Scans confirmed service lines carrying their own schedule; lines without a
/// schedule never hold the variation.
pub async fn check_variation_availability(
    tx: &mut Transaction<'_, Postgres>,
    variation_id: i64,
    proposed_start: NaiveDateTime,
    duration_hours: Decimal,
) -> Result<Availability, sqlx::Error> {
    if variation_id <= 0 {
        return Ok(Availability::blocked("invalid variation id"));
    }

    lock_resource(tx, system::VARIATION_LOCK_KEYSPACE, variation_id).await?;

    let variation = sqlx::query_as::<_, (bool,)>(
        "SELECT is_active FROM service_variations WHERE variation_id = $1",
    )
    .bind(variation_id)
    .fetch_optional(&mut **tx)
    .await?;

    match variation {
        Some((true,)) => {}
        Some((false,)) => {
            return Ok(Availability::blocked(format!(
                "variation {variation_id} is inactive"
            )))
        }
        None => {
            return Ok(Availability::blocked(format!(
                "variation {variation_id} not found"
            )))
        }
    }

    let proposed_end = proposed_start + hours_to_duration(duration_hours);

    let candidates = sqlx::query_as::<_, VariationCandidate>(
        r#"
        SELECT es.event_id, e.name AS event_name, es.scheduled_time, es.duration_hours
        FROM event_services es
        INNER JOIN events e ON e.event_id = es.event_id
        WHERE es.variation_id = $1
          AND es.status = $2
          AND es.scheduled_time IS NOT NULL
          AND es.scheduled_time <= $3
        "#,
    )
    .bind(variation_id)
    .bind(EventServiceStatus::Confirmed.as_str())
    .bind(proposed_end)
    .fetch_all(&mut **tx)
    .await?;

    let conflicts: Vec<ConflictRecord> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate_end = candidate.scheduled_time
                + candidate
                    .duration_hours
                    .map(hours_to_duration)
                    .unwrap_or_else(Duration::zero);
            windows_overlap(
                proposed_start,
                proposed_end,
                candidate.scheduled_time,
                candidate_end,
            )
            .then(|| ConflictRecord {
                event_id: candidate.event_id,
                event_name: candidate.event_name,
                start_time: candidate.scheduled_time,
                end_time: candidate_end,
            })
        })
        .collect();

    if conflicts.is_empty() {
        Ok(Availability::clear())
    } else {
        Ok(Availability::conflicted(conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_contained_window_overlaps() {
        assert!(windows_overlap(at(11, 0), at(12, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        assert!(!windows_overlap(at(12, 0), at(13, 0), at(10, 0), at(12, 0)));
        assert!(!windows_overlap(at(8, 0), at(10, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_partial_overlap() {
        assert!(windows_overlap(at(11, 30), at(13, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_disjoint_windows() {
        assert!(!windows_overlap(at(14, 0), at(15, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_fractional_hours_to_duration() {
        assert_eq!(hours_to_duration(dec!(1.5)), Duration::minutes(90));
        assert_eq!(hours_to_duration(dec!(2)), Duration::hours(2));
    }

    proptest! {
        /// Overlap holds exactly when the open intersection is non-empty.
        #[test]
        fn prop_overlap_matches_open_intersection(
            a_start in 0i64..10_000,
            a_len in 1i64..1_000,
            b_start in 0i64..10_000,
            b_len in 1i64..1_000,
        ) {
            let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let a0 = base + Duration::minutes(a_start);
            let a1 = a0 + Duration::minutes(a_len);
            let b0 = base + Duration::minutes(b_start);
            let b1 = b0 + Duration::minutes(b_len);

            let intersection_start = a0.max(b0);
            let intersection_end = a1.min(b1);
            let open_intersection_nonempty = intersection_start < intersection_end;

            prop_assert_eq!(windows_overlap(a0, a1, b0, b1), open_intersection_nonempty);
        }

        /// Overlap is symmetric in its two windows.
        #[test]
        fn prop_overlap_symmetric(
            a_start in 0i64..10_000,
            a_len in 1i64..1_000,
            b_start in 0i64..10_000,
            b_len in 1i64..1_000,
        ) {
            let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let a0 = base + Duration::minutes(a_start);
            let a1 = a0 + Duration::minutes(a_len);
            let b0 = base + Duration::minutes(b_start);
            let b1 = b0 + Duration::minutes(b_len);

            prop_assert_eq!(windows_overlap(a0, a1, b0, b1), windows_overlap(b0, b1, a0, a1));
        }
    }
}

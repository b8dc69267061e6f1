//! # System Constants
//!
//! Core enums and operational constants for the booking engine: event and
//! service-line lifecycle statuses, room availability states, account roles,
//! and the numeric bounds the validation layer enforces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an event booking.
///
/// `Pending` and `Confirmed` are the two states the toggle operation moves
/// between; only `Confirmed` bookings participate in conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    Accepted,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Rescheduled => "RESCHEDULED",
        }
    }

    /// Statuses that hold a resource and therefore block other bookings.
    pub fn blocks_resources(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "CONFIRMED" => Ok(Self::Confirmed),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "RESCHEDULED" => Ok(Self::Rescheduled),
            _ => Err(format!("Invalid event status: {s}")),
        }
    }
}

/// Status of a single service line. Independent of the owning event's status;
/// the engine never synchronizes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventServiceStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
}

impl EventServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Pending => "PENDING",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for EventServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(Self::Confirmed),
            "PENDING" => Ok(Self::Pending),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid service line status: {s}")),
        }
    }
}

/// Room availability flag, checked before any interval test runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomAvailability {
    Available,
    Occupied,
    Maintenance,
}

impl RoomAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for RoomAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role, used by the update-policy check in the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    Customer,
    Staff,
    Admin,
}

impl AccountRole {
    /// Privileged actors bypass ownership and lead-time restrictions.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "STAFF" => Ok(Self::Staff),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("Invalid account role: {s}")),
        }
    }
}

/// System-wide constants
pub mod system {
    /// Minimum length for an event name
    pub const MIN_NAME_LENGTH: usize = 3;

    /// Maximum length for an event name
    pub const MAX_NAME_LENGTH: usize = 255;

    /// Default page size for listings
    pub const DEFAULT_PAGE_LIMIT: i64 = 10;

    /// Upper bound on caller-requested page size
    pub const MAX_PAGE_LIMIT: i64 = 100;

    /// Minimum hours before start time that a non-privileged actor may modify a booking
    pub const MIN_UPDATE_LEAD_TIME_HOURS: i64 = 24;

    /// Days between invoice issue date and due date
    pub const INVOICE_DUE_DAYS: i64 = 7;

    /// Advisory-lock keyspace for room-scoped check-and-write sequences
    pub const ROOM_LOCK_KEYSPACE: i32 = 0xB00C;

    /// Advisory-lock keyspace for variation-scoped check-and-write sequences
    pub const VARIATION_LOCK_KEYSPACE: i32 = 0xB00D;
}

/// Sort fields the listing layer accepts; anything else falls back to the default.
pub mod sort_whitelist {
    pub const FIELDS: &[&str] = &[
        "created_at",
        "start_time",
        "event_date",
        "name",
        "estimated_cost",
    ];

    pub const DEFAULT_FIELD: &str = "created_at";
    pub const DEFAULT_DIRECTION: &str = "ASC";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_status_round_trip() {
        for status in [
            EventStatus::Pending,
            EventStatus::Accepted,
            EventStatus::Confirmed,
            EventStatus::InProgress,
            EventStatus::Completed,
            EventStatus::Cancelled,
            EventStatus::Rescheduled,
        ] {
            assert_eq!(EventStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(EventStatus::from_str("confirmed").is_err());
    }

    #[test]
    fn test_only_confirmed_blocks_resources() {
        assert!(EventStatus::Confirmed.blocks_resources());
        assert!(!EventStatus::Pending.blocks_resources());
        assert!(!EventStatus::Completed.blocks_resources());
    }

    #[test]
    fn test_role_privileges() {
        assert!(AccountRole::Admin.is_privileged());
        assert!(AccountRole::Staff.is_privileged());
        assert!(!AccountRole::Customer.is_privileged());
    }

    #[test]
    fn test_service_status_default() {
        assert_eq!(EventServiceStatus::default(), EventServiceStatus::Confirmed);
    }
}

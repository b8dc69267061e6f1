//! Structured error handling for the booking engine.
//!
//! Every expected failure mode (validation, bad reference, time conflict,
//! policy violation, blocked deletion, not found) is a distinct variant so the
//! operation boundary can render it as a negative response envelope. Database
//! and configuration errors are the only kinds treated as internal.

use crate::availability::ConflictRecord;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Caller-supplied data failed shape/range/required-field rules.
    /// Carries every problem found, not just the first.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A foreign id is missing, unknown, or inactive.
    #[error("Reference error: {0}")]
    Reference(String),

    /// The requested window overlaps existing confirmed bookings.
    #[error("Booking conflict: {reason}")]
    Conflict {
        reason: String,
        conflicts: Vec<ConflictRecord>,
    },

    /// Ownership or lead-time rules rejected the write.
    #[error("Policy violation: {0}")]
    Policy(String),

    /// Deletion blocked by dependent records.
    #[error("Deletion blocked: {0}")]
    Dependency(String),

    /// Unknown id on a single-record operation.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BookingError {
    /// Whether this error is an expected, caller-facing kind (4xx-equivalent)
    /// as opposed to an internal failure.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

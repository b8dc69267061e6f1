//! Uniform response envelope returned by every engine operation.
//!
//! Expected error kinds become negative envelopes with the full error list;
//! database/configuration failures are logged and flattened to a generic
//! message so internals never leak to the caller.

use serde::Serialize;

use crate::error::BookingError;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub errors: Vec<String>,
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            data: Some(data),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            data: None,
        }
    }

    pub fn failure_one(error: impl Into<String>) -> Self {
        Self::failure(vec![error.into()])
    }

    /// Map an engine error to an envelope, rendering conflict details as
    /// individual error strings and hiding internal failures.
    pub fn from_error(error: BookingError) -> Self {
        match error {
            BookingError::Validation(errors) => Self::failure(errors),
            BookingError::Conflict { reason, conflicts } => {
                let mut errors = vec![reason];
                errors.extend(conflicts.iter().map(|c| c.describe()));
                Self::failure(errors)
            }
            BookingError::Reference(msg)
            | BookingError::Policy(msg)
            | BookingError::Dependency(msg)
            | BookingError::NotFound(msg) => Self::failure_one(msg),
            BookingError::Database(ref db_err) => {
                crate::logging::log_error("booking", "database", &db_err.to_string(), None);
                Self::failure_one(INTERNAL_ERROR_MESSAGE)
            }
            BookingError::Configuration(ref msg) => {
                crate::logging::log_error("booking", "configuration", msg, None);
                Self::failure_one(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl<T> From<BookingError> for ServiceResponse<T> {
    fn from(error: BookingError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let response = ServiceResponse::ok(42);
        assert!(response.success);
        assert!(response.errors.is_empty());
        assert_eq!(response.data, Some(42));
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let response: ServiceResponse<()> =
            BookingError::Validation(vec!["a".to_string(), "b".to_string()]).into();
        assert!(!response.success);
        assert_eq!(response.errors, vec!["a", "b"]);
    }

    #[test]
    fn test_database_errors_are_masked() {
        let response: ServiceResponse<()> = BookingError::Database(sqlx::Error::PoolClosed).into();
        assert_eq!(response.errors, vec![INTERNAL_ERROR_MESSAGE]);
    }
}

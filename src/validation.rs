//! Input validation for the booking engine.
//!
//! Pure functions only: each validator inspects a payload and returns the full
//! list of problems found, so callers can surface every error at once instead
//! of stopping at the first. Absent optional fields are skipped, never
//! rejected.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::booking::requests::{CreateBookingRequest, ServiceLineRequest, UpdateBookingRequest};
use crate::constants::{system, EventServiceStatus, EventStatus};

/// Coerce an id supplied as a JSON number or numeric string. Returns `None`
/// for anything non-numeric or non-positive.
pub fn coerce_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    let len = name.trim().chars().count();
    if len < system::MIN_NAME_LENGTH {
        errors.push(format!(
            "name must be at least {} characters",
            system::MIN_NAME_LENGTH
        ));
    } else if len > system::MAX_NAME_LENGTH {
        errors.push(format!(
            "name must be at most {} characters",
            system::MAX_NAME_LENGTH
        ));
    }
}

fn check_date_range(start: NaiveDateTime, end: NaiveDateTime, errors: &mut Vec<String>) {
    if start >= end {
        errors.push("start_time must precede end_time".to_string());
    }
}

fn check_money(field: &str, amount: Option<Decimal>, errors: &mut Vec<String>) {
    if let Some(amount) = amount {
        if amount < Decimal::ZERO {
            errors.push(format!("{field} must not be negative"));
        }
    }
}

fn check_positive(field: &str, amount: Option<Decimal>, errors: &mut Vec<String>) {
    if let Some(amount) = amount {
        if amount <= Decimal::ZERO {
            errors.push(format!("{field} must be positive"));
        }
    }
}

fn check_event_status(status: Option<&str>, errors: &mut Vec<String>) {
    if let Some(status) = status {
        if status.parse::<EventStatus>().is_err() {
            errors.push(format!("status '{status}' is not a known event status"));
        }
    }
}

fn check_service_status(status: Option<&str>, errors: &mut Vec<String>) {
    if let Some(status) = status {
        if status.parse::<EventServiceStatus>().is_err() {
            errors.push(format!(
                "status '{status}' is not a known service line status"
            ));
        }
    }
}

/// Validate a create payload. Service lines are validated separately via
/// [`validate_service_line`] so per-line errors can name their position.
pub fn validate_create_booking(request: &CreateBookingRequest) -> Vec<String> {
    let mut errors = Vec::new();

    check_name(&request.name, &mut errors);
    check_date_range(request.start_time, request.end_time, &mut errors);
    check_money("estimated_cost", request.estimated_cost, &mut errors);
    check_money("final_cost", request.final_cost, &mut errors);
    check_money("room_service_fee", request.room_service_fee, &mut errors);
    check_positive("duration_hours", request.duration_hours, &mut errors);
    check_event_status(request.status.as_deref(), &mut errors);

    errors
}

/// Validate a partial update payload; only supplied fields are checked.
pub fn validate_update_booking(request: &UpdateBookingRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(ref name) = request.name {
        check_name(name, &mut errors);
    }
    if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
        check_date_range(start, end, &mut errors);
    }
    check_money("estimated_cost", request.estimated_cost, &mut errors);
    check_money("final_cost", request.final_cost, &mut errors);
    check_money("room_service_fee", request.room_service_fee, &mut errors);
    check_positive("duration_hours", request.duration_hours, &mut errors);
    check_event_status(request.status.as_deref(), &mut errors);

    errors
}

/// Validate one service line; `position` is used to label the errors.
pub fn validate_service_line(line: &ServiceLineRequest, position: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if line.service_id <= 0 {
        errors.push(format!("service_lines[{position}]: service_id is required"));
    }
    if let Some(quantity) = line.quantity {
        if quantity < 1 {
            errors.push(format!(
                "service_lines[{position}]: quantity must be at least 1"
            ));
        }
    }
    if let Some(price) = line.custom_price {
        if price < Decimal::ZERO {
            errors.push(format!(
                "service_lines[{position}]: custom_price must not be negative"
            ));
        }
    }
    if let Some(duration) = line.duration_hours {
        if duration <= Decimal::ZERO {
            errors.push(format!(
                "service_lines[{position}]: duration_hours must be positive"
            ));
        }
    }
    if line.scheduled_time.is_some() && line.duration_hours.is_none() {
        errors.push(format!(
            "service_lines[{position}]: scheduled_time requires duration_hours"
        ));
    }
    let status = line.status.as_deref();
    let mut status_errors = Vec::new();
    check_service_status(status, &mut status_errors);
    errors.extend(
        status_errors
            .into_iter()
            .map(|e| format!("service_lines[{position}]: {e}")),
    );

    errors
}

/// Validate pagination parameters: page >= 1 and a bounded limit.
pub fn validate_page_params(page: Option<i64>, limit: Option<i64>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(page) = page {
        if page < 1 {
            errors.push("page must be at least 1".to_string());
        }
    }
    if let Some(limit) = limit {
        if limit < 1 {
            errors.push("limit must be at least 1".to_string());
        } else if limit > system::MAX_PAGE_LIMIT {
            errors.push(format!("limit must be at most {}", system::MAX_PAGE_LIMIT));
        }
    }

    errors
}

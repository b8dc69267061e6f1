//! # Query Scopes
//!
//! Chainable, type-safe query building for the event read paths. Each filter
//! appends a parameterized condition; sorting is restricted to a whitelist and
//! anything unrecognized silently falls back to the default ordering rather
//! than erroring.

use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::constants::{sort_whitelist, EventStatus};
use crate::models::Event;

/// Query builder for Event scopes.
///
/// Construct with [`Event::scope`] for row queries or [`Event::scope_count`]
/// for a COUNT(*) over the same conditions.
pub struct EventScope {
    query: QueryBuilder<'static, Postgres>,
    has_conditions: bool,
}

impl Event {
    /// Start building a scoped query
    pub fn scope() -> EventScope {
        EventScope {
            query: QueryBuilder::new("SELECT events.* FROM events"),
            has_conditions: false,
        }
    }

    /// Start building a count query over the same filters
    pub fn scope_count() -> EventScope {
        EventScope {
            query: QueryBuilder::new("SELECT COUNT(*) FROM events"),
            has_conditions: false,
        }
    }
}

impl EventScope {
    /// Add WHERE clause helper
    fn add_condition(&mut self, condition: &str) {
        if self.has_conditions {
            self.query.push(" AND ");
        } else {
            self.query.push(" WHERE ");
            self.has_conditions = true;
        }
        self.query.push(condition);
    }

    /// Scope: events owned by an account
    pub fn for_account(mut self, account_id: i64) -> Self {
        self.add_condition("events.account_id = ");
        self.query.push_bind(account_id);
        self
    }

    /// Scope: events booked into a room
    pub fn for_room(mut self, room_id: i64) -> Self {
        self.add_condition("events.room_id = ");
        self.query.push_bind(room_id);
        self
    }

    /// Scope: events of a given type
    pub fn for_event_type(mut self, event_type_id: i64) -> Self {
        self.add_condition("events.event_type_id = ");
        self.query.push_bind(event_type_id);
        self
    }

    /// Scope: events in a lifecycle status
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.add_condition("events.status = ");
        self.query.push_bind(status.as_str());
        self
    }

    /// Scope: events starting at or after a point in time
    pub fn starts_on_or_after(mut self, from: NaiveDateTime) -> Self {
        self.add_condition("events.start_time >= ");
        self.query.push_bind(from);
        self
    }

    /// Scope: events starting at or before a point in time
    pub fn starts_on_or_before(mut self, until: NaiveDateTime) -> Self {
        self.add_condition("events.start_time <= ");
        self.query.push_bind(until);
        self
    }

    /// Scope: case-insensitive substring search over name and description
    pub fn search(mut self, term: &str) -> Self {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        self.add_condition("(events.name ILIKE ");
        self.query.push_bind(pattern.clone());
        self.query.push(" OR events.description ILIKE ");
        self.query.push_bind(pattern);
        self.query.push(")");
        self
    }

    /// Sorting over the whitelist; unknown fields/directions fall back to the
    /// default (creation time ascending) rather than erroring.
    pub fn order_by(mut self, field: Option<&str>, direction: Option<&str>) -> Self {
        let field = field
            .filter(|f| sort_whitelist::FIELDS.contains(f))
            .unwrap_or(sort_whitelist::DEFAULT_FIELD);
        let direction = match direction.map(str::to_ascii_uppercase).as_deref() {
            Some("ASC") => "ASC",
            Some("DESC") => "DESC",
            _ => sort_whitelist::DEFAULT_DIRECTION,
        };

        self.query
            .push(format!(" ORDER BY events.{field} {direction}"));
        self
    }

    /// Offset pagination; callers validate bounds beforehand.
    pub fn paginate(mut self, page: i64, limit: i64) -> Self {
        let offset = (page - 1) * limit;
        self.query.push(" LIMIT ");
        self.query.push_bind(limit);
        self.query.push(" OFFSET ");
        self.query.push_bind(offset);
        self
    }

    /// Build the final query and execute it
    pub async fn all(mut self, pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        self.query.build_query_as::<Event>().fetch_all(pool).await
    }

    /// Count the results; only valid on a [`Event::scope_count`] builder.
    pub async fn count(mut self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.query.build_query_scalar::<i64>().fetch_one(pool).await
    }
}

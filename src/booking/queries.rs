//! # Booking Queries
//!
//! Filtered, paginated read access over stored bookings, plus single-record
//! fetches with typed include flags. Every recognized filter and include is an
//! explicit field with a default; related records are only joined in when the
//! caller asks for them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::constants::{system, EventStatus};
use crate::error::BookingError;
use crate::models::{Account, Event, EventService, EventType, Room};
use crate::response::ServiceResponse;
use crate::scopes::EventScope;
use crate::validation;

/// Listing filters; every recognized option is an explicit field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilters {
    pub account_id: Option<i64>,
    pub room_id: Option<i64>,
    pub event_type_id: Option<i64>,
    pub status: Option<String>,
    pub start_from: Option<NaiveDateTime>,
    pub start_until: Option<NaiveDateTime>,
    pub search: Option<String>,
}

/// Pagination and sort inputs. Page defaults to 1, limit to the system
/// default (bounded); unknown sort fields fall back silently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl PageParams {
    fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(system::DEFAULT_PAGE_LIMIT)
            .min(system::MAX_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedEvents {
    pub items: Vec<Event>,
    pub pagination: Pagination,
}

/// Which related records to attach on single-record and type-scoped reads.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EventIncludes {
    pub account: bool,
    pub room: bool,
    pub event_type: bool,
    pub services: bool,
}

/// One booking with its requested related records attached.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub event: Event,
    pub account: Option<Account>,
    pub room: Option<Room>,
    pub event_type: Option<EventType>,
    pub services: Option<Vec<EventService>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypedEvents {
    pub items: Vec<BookingDetails>,
    pub total_count: i64,
}

#[derive(Clone)]
pub struct BookingQueries {
    pool: PgPool,
}

impl BookingQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, paginated listing sorted over the whitelist.
    #[instrument(skip(self, filters, page_params))]
    pub async fn list_bookings(
        &self,
        filters: EventFilters,
        page_params: PageParams,
    ) -> ServiceResponse<PagedEvents> {
        match self.list_bookings_inner(filters, page_params).await {
            Ok(paged) => ServiceResponse::ok(paged),
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn list_bookings_inner(
        &self,
        filters: EventFilters,
        page_params: PageParams,
    ) -> Result<PagedEvents, BookingError> {
        let mut errors = validation::validate_page_params(page_params.page, page_params.limit);
        let status = match filters.status.as_deref() {
            Some(raw) => match raw.parse::<EventStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        let page = page_params.page();
        let limit = page_params.limit();

        let total_count = apply_filters(Event::scope_count(), &filters, status)
            .count(&self.pool)
            .await?;

        let items = apply_filters(Event::scope(), &filters, status)
            .order_by(
                page_params.sort_by.as_deref(),
                page_params.sort_direction.as_deref(),
            )
            .paginate(page, limit)
            .all(&self.pool)
            .await?;

        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + limit - 1) / limit
        };

        Ok(PagedEvents {
            items,
            pagination: Pagination {
                page,
                limit,
                total_count,
                total_pages,
            },
        })
    }

    /// Single-record fetch with typed includes.
    #[instrument(skip(self, includes))]
    pub async fn get_booking(
        &self,
        event_id: i64,
        includes: EventIncludes,
    ) -> ServiceResponse<BookingDetails> {
        match self.get_booking_inner(event_id, includes).await {
            Ok(details) => ServiceResponse::ok(details),
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn get_booking_inner(
        &self,
        event_id: i64,
        includes: EventIncludes,
    ) -> Result<BookingDetails, BookingError> {
        let event = Event::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("event {event_id} not found")))?;

        self.attach_includes(event, includes).await
    }

    /// Listing scoped to an event type, with the same include pattern and a
    /// total count alongside the items.
    #[instrument(skip(self, includes, page_params))]
    pub async fn list_bookings_by_type(
        &self,
        event_type_id: i64,
        includes: EventIncludes,
        page_params: PageParams,
    ) -> ServiceResponse<TypedEvents> {
        match self
            .list_by_type_inner(event_type_id, includes, page_params)
            .await
        {
            Ok(typed) => ServiceResponse::ok(typed),
            Err(err) => ServiceResponse::from_error(err),
        }
    }

    async fn list_by_type_inner(
        &self,
        event_type_id: i64,
        includes: EventIncludes,
        page_params: PageParams,
    ) -> Result<TypedEvents, BookingError> {
        let errors = validation::validate_page_params(page_params.page, page_params.limit);
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        let total_count = Event::scope_count()
            .for_event_type(event_type_id)
            .count(&self.pool)
            .await?;

        let events = Event::scope()
            .for_event_type(event_type_id)
            .order_by(
                page_params.sort_by.as_deref(),
                page_params.sort_direction.as_deref(),
            )
            .paginate(page_params.page(), page_params.limit())
            .all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(events.len());
        for event in events {
            items.push(self.attach_includes(event, includes).await?);
        }

        Ok(TypedEvents { items, total_count })
    }

    /// Fetch only the related records the caller asked for.
    async fn attach_includes(
        &self,
        event: Event,
        includes: EventIncludes,
    ) -> Result<BookingDetails, BookingError> {
        let account = match (includes.account, event.account_id) {
            (true, Some(id)) => Account::find_by_id(&self.pool, id).await?,
            _ => None,
        };
        let room = match (includes.room, event.room_id) {
            (true, Some(id)) => Room::find_by_id(&self.pool, id).await?,
            _ => None,
        };
        let event_type = match (includes.event_type, event.event_type_id) {
            (true, Some(id)) => EventType::find_by_id(&self.pool, id).await?,
            _ => None,
        };
        let services = if includes.services {
            Some(EventService::list_for_event(&self.pool, event.event_id).await?)
        } else {
            None
        };

        Ok(BookingDetails {
            event,
            account,
            room,
            event_type,
            services,
        })
    }
}

fn apply_filters(
    mut scope: EventScope,
    filters: &EventFilters,
    status: Option<EventStatus>,
) -> EventScope {
    if let Some(account_id) = filters.account_id {
        scope = scope.for_account(account_id);
    }
    if let Some(room_id) = filters.room_id {
        scope = scope.for_room(room_id);
    }
    if let Some(event_type_id) = filters.event_type_id {
        scope = scope.for_event_type(event_type_id);
    }
    if let Some(status) = status {
        scope = scope.with_status(status);
    }
    if let Some(from) = filters.start_from {
        scope = scope.starts_on_or_after(from);
    }
    if let Some(until) = filters.start_until {
        scope = scope.starts_on_or_before(until);
    }
    if let Some(ref term) = filters.search {
        scope = scope.search(term);
    }
    scope
}

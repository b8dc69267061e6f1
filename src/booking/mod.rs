//! Booking operations: the coordinator for atomic writes, the lifecycle
//! manager for status/deletion rules, and the query layer for reads.

pub mod coordinator;
pub mod lifecycle;
pub mod queries;
pub mod requests;

pub use coordinator::{BookingCoordinator, BookingRecord};
pub use lifecycle::{DeletionReport, LifecycleManager};
pub use queries::{
    BookingDetails, BookingQueries, EventFilters, EventIncludes, PagedEvents, PageParams,
    Pagination, TypedEvents,
};
pub use requests::{Actor, CreateBookingRequest, ServiceLineRequest, UpdateBookingRequest};

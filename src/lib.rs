#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Venue Booking Core
//!
//! Booking transaction engine for venue resources: rooms and add-on service
//! variations booked against scheduled events.
//!
//! ## Overview
//!
//! The engine guarantees two things about stored state: no two confirmed
//! bookings for the same physical resource overlap in time, and every
//! booking's financial record (estimated cost, invoice, invoice line items)
//! stays consistent with the room and service lines attached to it.
//!
//! HTTP routing, authentication, response formatting, and notification
//! delivery are external collaborators; this crate is the library-level
//! contract they call into.
//!
//! ## Architecture
//!
//! Every booking write runs as one atomic PostgreSQL transaction: validation,
//! reference checks, availability checks under resource advisory locks, cost
//! computation, then persistence of event + service lines + invoice. Either
//! all effects become visible or none do.
//!
//! ## Module Organization
//!
//! - [`models`] - Data layer: events, service lines, invoices, and the
//!   read-only resource directories (rooms, variations, event types, accounts)
//! - [`booking`] - The coordinator, lifecycle manager, and query layer
//! - [`availability`] - Interval-overlap conflict detection per resource
//! - [`pricing`] - Cost aggregation and invoice item derivation
//! - [`validation`] - Pure field validation returning full error lists
//! - [`scopes`] - Chainable query scopes for the read paths
//! - [`database`] - Explicitly constructed connection handle
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use venue_booking_core::booking::{BookingCoordinator, CreateBookingRequest};
//! use venue_booking_core::database::DatabaseConnection;
//!
//! # async fn example(request: CreateBookingRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::new().await?;
//! let coordinator = BookingCoordinator::new(db.pool().clone());
//!
//! let response = coordinator.create_booking(request).await;
//! if response.success {
//!     let record = response.data.unwrap();
//!     println!("Booked event {}", record.event.event_id);
//! } else {
//!     eprintln!("Rejected: {}", response.errors.join("; "));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Integration tests use SQLx native testing with automatic database
//! isolation per test:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod availability;
pub mod booking;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod pricing;
pub mod response;
pub mod scopes;
pub mod validation;

pub use booking::{
    Actor, BookingCoordinator, BookingQueries, CreateBookingRequest, LifecycleManager,
    UpdateBookingRequest,
};
pub use config::BookingConfig;
pub use constants::{AccountRole, EventServiceStatus, EventStatus, RoomAvailability};
pub use database::DatabaseConnection;
pub use error::{BookingError, Result};
pub use response::ServiceResponse;

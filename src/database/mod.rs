//! Database connection management.
//!
//! The engine never holds process-global state; callers construct a
//! [`DatabaseConnection`] at startup and pass its pool down explicitly.

pub mod connection;

pub use connection::DatabaseConnection;

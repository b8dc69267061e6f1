pub mod account;
pub mod event;
pub mod event_service;
pub mod event_type;
pub mod invoice;
pub mod payment;
pub mod review;
pub mod room;
pub mod service;

// Re-export core models for easy access
pub use account::Account;
pub use event::{DependencyCounts, Event, EventChanges, NewEvent};
pub use event_service::{EventService, NewEventService};
pub use event_type::EventType;
pub use invoice::{Invoice, InvoiceDetail, NewInvoice, NewInvoiceDetail};
pub use payment::Payment;
pub use review::Review;
pub use room::Room;
pub use service::{Service, Variation};

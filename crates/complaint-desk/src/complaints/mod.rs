//! Complaint intake, lookup and status tracking.
//!
//! `ComplaintService` owns the business rules (validation, the `new` starting status,
//! timestamps and newest-first ordering) and talks to a `ComplaintStore` once per call.
//! `router` puts the service behind JSON endpoints.

pub mod domain;
pub mod export;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    validate_email, Complaint, ComplaintId, ComplaintStatus, NewComplaint, ValidationError,
};
pub use export::write_csv;
pub use query::{sort_newest_first, ComplaintFilter, ComplaintStats};
pub use repository::{ComplaintRow, ComplaintStore, StorageError};
pub use router::complaint_router;
pub use service::{Clock, ComplaintService, ComplaintServiceError, SystemClock};
pub use store::{InMemoryComplaintStore, JsonFileComplaintStore};

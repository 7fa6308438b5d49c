use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    validate_email, Complaint, ComplaintId, ComplaintStatus, NewComplaint, ValidationError,
};
use super::query::sort_newest_first;
use super::repository::{ComplaintRow, ComplaintStore, StorageError};

/// Source of "now" for complaint timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Complaint operations over a store: intake, lookups and status changes.
pub struct ComplaintService<S, C = SystemClock> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S> ComplaintService<S, SystemClock>
where
    S: ComplaintStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }
}

impl<S, C> ComplaintService<S, C>
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Record a new complaint. Status always starts at `new` and both timestamps are equal.
    pub fn create(&self, input: NewComplaint) -> Result<Complaint, ComplaintServiceError> {
        input.validate()?;

        let now = self.clock.now();
        let row = ComplaintRow {
            title: input.title,
            description: input.description,
            customer_email: input.customer_email,
            status: ComplaintStatus::New,
            created_at: now,
            updated_at: now,
        };

        let complaint = self.store.insert(row).map_err(storage_failure("create"))?;
        info!(complaint_id = %complaint.id, "complaint recorded");
        Ok(complaint)
    }

    /// Look up a single complaint; a missing id is `Ok(None)`, not an error.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Complaint>, ComplaintServiceError> {
        let id = ComplaintId::parse(id)?;
        let complaint = self.store.fetch(id).map_err(storage_failure("get_by_id"))?;
        debug!(complaint_id = %id, found = complaint.is_some(), "complaint lookup");
        Ok(complaint)
    }

    /// Every complaint filed under exactly this address, newest first.
    pub fn get_by_email(
        &self,
        customer_email: &str,
    ) -> Result<Vec<Complaint>, ComplaintServiceError> {
        validate_email(customer_email)?;
        let mut complaints = self
            .store
            .by_email(customer_email)
            .map_err(storage_failure("get_by_email"))?;
        sort_newest_first(&mut complaints);
        debug!(matches = complaints.len(), "complaints by email");
        Ok(complaints)
    }

    /// Every complaint in the store, newest first.
    pub fn get_all(&self) -> Result<Vec<Complaint>, ComplaintServiceError> {
        let mut complaints = self.store.all().map_err(storage_failure("get_all"))?;
        sort_newest_first(&mut complaints);
        debug!(total = complaints.len(), "all complaints");
        Ok(complaints)
    }

    /// Move a complaint to `status`. Only `status` and `updated_at` change.
    pub fn update_status(
        &self,
        id: i64,
        status: ComplaintStatus,
    ) -> Result<Complaint, ComplaintServiceError> {
        let id = ComplaintId::parse(id)?;
        let now = self.clock.now();

        let updated = self
            .store
            .update_status(id, status, now)
            .map_err(storage_failure("update_status"))?
            .ok_or(ComplaintServiceError::NotFound { id })?;

        info!(complaint_id = %id, status = %status, "complaint status updated");
        Ok(updated)
    }

    /// String-typed variant used by transport layers.
    pub fn update_status_str(
        &self,
        id: i64,
        status: &str,
    ) -> Result<Complaint, ComplaintServiceError> {
        let status = status.parse::<ComplaintStatus>()?;
        self.update_status(id, status)
    }
}

fn storage_failure(operation: &'static str) -> impl Fn(StorageError) -> ComplaintServiceError {
    move |err| {
        warn!(operation, error = %err, "complaint store failure");
        ComplaintServiceError::Storage(err)
    }
}

/// Error raised by the complaint service.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("complaint with id {id} not found")]
    NotFound { id: ComplaintId },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

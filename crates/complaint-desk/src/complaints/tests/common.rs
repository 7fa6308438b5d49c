use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::complaints::complaint_router;
use crate::complaints::domain::{Complaint, ComplaintId, ComplaintStatus, NewComplaint};
use crate::complaints::repository::{ComplaintRow, ComplaintStore, StorageError};
use crate::complaints::service::{Clock, ComplaintService};
use crate::complaints::store::InMemoryComplaintStore;

/// Clock that moves forward one second every time it is read.
#[derive(Debug)]
pub(super) struct SteppingClock {
    current: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(super) fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub(super) fn rewind(&self, by: Duration) {
        let mut guard = self.current.lock().expect("clock mutex poisoned");
        *guard -= by;
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::starting_at(start_time())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut guard = self.current.lock().expect("clock mutex poisoned");
        let now = *guard;
        *guard = now + Duration::seconds(1);
        now
    }
}

pub(super) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0)
        .single()
        .expect("valid start time")
}

pub(super) fn new_complaint(title: &str, email: &str) -> NewComplaint {
    NewComplaint {
        title: title.to_string(),
        description: "Cracked casing".to_string(),
        customer_email: email.to_string(),
    }
}

pub(super) fn defective_part() -> NewComplaint {
    new_complaint("Defective part", "a@b.com")
}

pub(super) type TestService = ComplaintService<RecordingStore, SteppingClock>;

pub(super) fn build_service() -> (TestService, Arc<RecordingStore>, Arc<SteppingClock>) {
    let store = Arc::new(RecordingStore::default());
    let clock = Arc::new(SteppingClock::default());
    let service = ComplaintService::with_clock(store.clone(), clock.clone());
    (service, store, clock)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    complaint_router(Arc::new(service))
}

/// In-memory store that counts how often it is touched.
#[derive(Debug, Default)]
pub(super) struct RecordingStore {
    inner: InMemoryComplaintStore,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl RecordingStore {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ComplaintStore for RecordingStore {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        self.touch();
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(row)
    }

    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        self.touch();
        self.inner.fetch(id)
    }

    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        self.touch();
        self.inner.by_email(customer_email)
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        self.touch();
        self.inner.all()
    }

    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        self.touch();
        let outcome = self.inner.update_status(id, status, updated_at)?;
        if outcome.is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
    }
}

/// Store whose rows come back oldest first, to prove ordering is the service's job.
#[derive(Debug, Default)]
pub(super) struct OldestFirstStore {
    inner: InMemoryComplaintStore,
}

impl ComplaintStore for OldestFirstStore {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        self.inner.insert(row)
    }

    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        self.inner.fetch(id)
    }

    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        let mut rows = self.inner.by_email(customer_email)?;
        rows.sort_by_key(|complaint| complaint.created_at);
        Ok(rows)
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        let mut rows = self.inner.all()?;
        rows.sort_by_key(|complaint| complaint.created_at);
        Ok(rows)
    }

    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        self.inner.update_status(id, status, updated_at)
    }
}

pub(super) struct UnavailableStore;

impl ComplaintStore for UnavailableStore {
    fn insert(&self, _row: ComplaintRow) -> Result<Complaint, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn by_email(&self, _customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: ComplaintId,
        _status: ComplaintStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

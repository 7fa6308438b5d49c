use chrono::{DateTime, Utc};
use complaint_desk::complaints::{
    Complaint, ComplaintId, ComplaintRow, ComplaintStatus, ComplaintStore,
    InMemoryComplaintStore, JsonFileComplaintStore, StorageError,
};
use complaint_desk::config::StorageConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store picked at startup from `COMPLAINTS_DATA_FILE`.
#[derive(Debug)]
pub(crate) enum ConfiguredStore {
    Memory(InMemoryComplaintStore),
    File(JsonFileComplaintStore),
}

impl ConfiguredStore {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        match &config.data_file {
            Some(path) => Ok(Self::File(JsonFileComplaintStore::open(path)?)),
            None => Ok(Self::Memory(InMemoryComplaintStore::new())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::File(store) => store.path().display().to_string(),
        }
    }
}

impl ComplaintStore for ConfiguredStore {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        match self {
            Self::Memory(store) => store.insert(row),
            Self::File(store) => store.insert(row),
        }
    }

    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        match self {
            Self::Memory(store) => store.fetch(id),
            Self::File(store) => store.fetch(id),
        }
    }

    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        match self {
            Self::Memory(store) => store.by_email(customer_email),
            Self::File(store) => store.by_email(customer_email),
        }
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        match self {
            Self::Memory(store) => store.all(),
            Self::File(store) => store.all(),
        }
    }

    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        match self {
            Self::Memory(store) => store.update_status(id, status, updated_at),
            Self::File(store) => store.update_status(id, status, updated_at),
        }
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<ComplaintStatus, String> {
    raw.trim().parse::<ComplaintStatus>().map_err(|err| {
        let known: Vec<&str> = ComplaintStatus::ALL
            .iter()
            .map(|status| status.label())
            .collect();
        format!("{err}; expected one of {}", known.join(", "))
    })
}

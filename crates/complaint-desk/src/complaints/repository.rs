use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Complaint, ComplaintId, ComplaintStatus};

/// Row handed to the store on insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRow {
    pub title: String,
    pub description: String,
    pub customer_email: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplaintRow {
    pub fn into_complaint(self, id: ComplaintId) -> Complaint {
        Complaint {
            id,
            title: self.title,
            description: self.description,
            customer_email: self.customer_email,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Storage abstraction so the service can be exercised without a real database.
///
/// Every method is a single unit of work against the store. Implementations return
/// rows in whatever order is convenient; the service owns the ordering contract.
pub trait ComplaintStore: Send + Sync {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError>;
    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError>;
    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError>;
    fn all(&self) -> Result<Vec<Complaint>, StorageError>;
    /// Conditional update: `Ok(None)` when no row has `id`, and nothing is written.
    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored data is inconsistent: {0}")]
    Corrupt(String),
}

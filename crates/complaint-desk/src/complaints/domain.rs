use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub i64);

impl ComplaintId {
    /// Accepts only positive identifiers; the store never assigns anything else.
    pub fn parse(raw: i64) -> Result<Self, ValidationError> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(ValidationError::InvalidId { id: raw })
        }
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a complaint. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    New,
    InProgress,
    PendingUserInfo,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::New,
        ComplaintStatus::InProgress,
        ComplaintStatus::PendingUserInfo,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ComplaintStatus::New => "new",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::PendingUserInfo => "pending_user_info",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    /// Statuses that still need attention from the support desk.
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            ComplaintStatus::New | ComplaintStatus::InProgress | ComplaintStatus::PendingUserInfo
        )
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| ValidationError::InvalidStatus {
                value: value.to_string(),
            })
    }
}

/// A customer-reported issue as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub title: String,
    pub description: String,
    pub customer_email: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intake payload. Carries no status; every complaint starts as `new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub customer_email: String,
}

impl NewComplaint {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        validate_email(&self.customer_email)
    }
}

/// Input rejected before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("description is required")]
    EmptyDescription,
    #[error("valid email is required (got '{email}')")]
    InvalidEmail { email: String },
    #[error("unknown complaint status '{value}'")]
    InvalidStatus { value: String },
    #[error("complaint id must be a positive integer (got {id})")]
    InvalidId { id: i64 },
}

const MAX_LOCAL_PART: usize = 64;
const MAX_EMAIL_LEN: usize = 254;

/// Syntactic email check: one `@`, an ASCII local part and a dotted ASCII domain whose
/// last label is letters only.
///
/// The address is checked as given; no trimming or case folding happens here or at
/// lookup time.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail {
        email: email.to_string(),
    };

    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if domain.contains('@') {
        return Err(invalid());
    }
    if local.is_empty() || local.len() > MAX_LOCAL_PART {
        return Err(invalid());
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid());
    }
    if !local.chars().all(is_local_part_char) {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    if labels_ok && tld_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn is_local_part_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '.' | '-')
}

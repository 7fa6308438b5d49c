//! Ordering, filtering and dashboard figures over fetched complaint lists.
//!
//! Lists leave the service newest first (`created_at` descending, ties broken by the
//! higher id). Filtering here never reorders, so a filtered view of an unchanged table
//! comes out the same on every call.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Complaint, ComplaintStatus};

/// Newest-first ordering shared by every list operation.
pub fn newest_first(a: &Complaint, b: &Complaint) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub fn sort_newest_first(complaints: &mut [Complaint]) {
    complaints.sort_by(newest_first);
}

/// Admin dashboard filter: free-text search plus an optional exact status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<ComplaintStatus>,
}

impl ComplaintFilter {
    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.status.is_none()
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Case-insensitive substring match on title, description or email, and status equality.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        let status_ok = self
            .status
            .map_or(true, |status| complaint.status == status);
        status_ok && matches_needle(complaint, self.needle().as_deref())
    }

    /// Keeps matching complaints in their incoming order.
    pub fn apply(&self, complaints: Vec<Complaint>) -> Vec<Complaint> {
        complaints
            .into_iter()
            .filter(|complaint| self.matches(complaint))
            .collect()
    }
}

fn matches_needle(complaint: &Complaint, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    [
        complaint.title.as_str(),
        complaint.description.as_str(),
        complaint.customer_email.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    /// Complaints still waiting on the desk or the customer.
    pub pending_action: usize,
    pub resolved: usize,
    /// Share of complaints closed out (resolved or rejected), as a percentage.
    pub resolution_rate: f64,
}

impl ComplaintStats {
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> = ComplaintStatus::ALL
            .into_iter()
            .map(|status| (status.label(), 0))
            .collect();
        for complaint in complaints {
            *by_status.entry(complaint.status.label()).or_default() += 1;
        }

        let total = complaints.len();
        let pending_action = complaints
            .iter()
            .filter(|complaint| complaint.status.is_open())
            .count();
        let closed = total - pending_action;
        let resolved = by_status
            .get(ComplaintStatus::Resolved.label())
            .copied()
            .unwrap_or_default();
        let resolution_rate = if total == 0 {
            0.0
        } else {
            closed as f64 / total as f64 * 100.0
        };

        Self {
            total,
            by_status,
            pending_action,
            resolved,
            resolution_rate,
        }
    }

    pub fn count(&self, status: ComplaintStatus) -> usize {
        self.by_status.get(status.label()).copied().unwrap_or_default()
    }
}

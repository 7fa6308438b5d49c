use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};

use super::domain::{Complaint, ComplaintId, ComplaintStatus};
use super::repository::{ComplaintRow, ComplaintStore, StorageError};

/// Table contents plus the id sequence, shared by both store flavours.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState {
    next_id: i64,
    complaints: BTreeMap<i64, Complaint>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            next_id: 1,
            complaints: BTreeMap::new(),
        }
    }
}

impl StoreState {
    fn insert(&mut self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StorageError::Unavailable("complaint id sequence exhausted".into()))?;
        let complaint = row.into_complaint(ComplaintId(id));
        self.complaints.insert(id, complaint.clone());
        Ok(complaint)
    }

    fn fetch(&self, id: ComplaintId) -> Option<Complaint> {
        self.complaints.get(&id.0).cloned()
    }

    fn by_email(&self, customer_email: &str) -> Vec<Complaint> {
        self.complaints
            .values()
            .filter(|complaint| complaint.customer_email == customer_email)
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<Complaint> {
        self.complaints.values().cloned().collect()
    }

    fn update_status(
        &mut self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Option<Complaint> {
        let complaint = self.complaints.get_mut(&id.0)?;
        complaint.status = status;
        // updated_at never moves backwards, which also keeps it >= created_at.
        complaint.updated_at = updated_at.max(complaint.updated_at);
        Some(complaint.clone())
    }

    /// Snapshot sanity checks run on load.
    fn check(&self) -> Result<(), StorageError> {
        for (key, complaint) in &self.complaints {
            if complaint.id.0 != *key {
                return Err(StorageError::Corrupt(format!(
                    "row keyed {key} carries id {}",
                    complaint.id
                )));
            }
            if complaint.created_at > complaint.updated_at {
                return Err(StorageError::Corrupt(format!(
                    "complaint {key} was updated before it was created"
                )));
            }
        }
        if let Some(max) = self.complaints.keys().next_back() {
            if self.next_id <= *max {
                return Err(StorageError::Corrupt(format!(
                    "id sequence {} would reuse existing id {max}",
                    self.next_id
                )));
            }
        }
        Ok(())
    }
}

fn lock(state: &Mutex<StoreState>) -> Result<MutexGuard<'_, StoreState>, StorageError> {
    state
        .lock()
        .map_err(|_| StorageError::Unavailable("store mutex poisoned".into()))
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    state: Mutex<StoreState>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComplaintStore for InMemoryComplaintStore {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        lock(&self.state)?.insert(row)
    }

    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        Ok(lock(&self.state)?.fetch(id))
    }

    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        Ok(lock(&self.state)?.by_email(customer_email))
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        Ok(lock(&self.state)?.all())
    }

    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        Ok(lock(&self.state)?.update_status(id, status, updated_at))
    }
}

/// Store persisted as a JSON snapshot file.
///
/// The file is the only copy of the table, so several processes (the server and the
/// admin CLI) can share one path. Every operation takes an advisory lock on a sibling
/// `.lock` file: shared for reads, exclusive for writes. A write reloads the snapshot,
/// applies its change, writes the result to a temp sibling and renames it over the
/// snapshot, so a failed write leaves the file as it was.
#[derive(Debug)]
pub struct JsonFileComplaintStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileComplaintStore {
    /// Opens the snapshot at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self {
            lock_path: sibling_path(&path, "lock"),
            path,
        };

        let rows = store.read(|state| state.complaints.len())?;
        tracing::debug!(path = %store.path.display(), rows, "complaint store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<RwLock<fs::File>, StorageError> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    fn read<T>(&self, view: impl FnOnce(&StoreState) -> T) -> Result<T, StorageError> {
        let lock = self.lock_file()?;
        let _guard = lock.read()?;
        let state = load_snapshot(&self.path)?;
        Ok(view(&state))
    }

    /// Runs `mutate` against the current snapshot under the exclusive lock. The
    /// snapshot is rewritten only when `mutate` reports a change.
    fn write<T>(
        &self,
        mutate: impl FnOnce(&mut StoreState) -> Result<(T, bool), StorageError>,
    ) -> Result<T, StorageError> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write()?;
        let mut state = load_snapshot(&self.path)?;
        let (outcome, changed) = mutate(&mut state)?;
        if changed {
            self.persist(&state)?;
        }
        Ok(outcome)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StorageError> {
        let staging = sibling_path(&self.path, "tmp");
        let file = fs::File::create(&staging)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, state)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|err| StorageError::Io(err.into_error()))?
            .sync_all()?;

        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> Result<StoreState, StorageError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoreState::default()),
        Err(err) => return Err(err.into()),
    };
    let state: StoreState = serde_json::from_slice(&raw)?;
    state.check()?;
    Ok(state)
}

fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "complaints.json".into());
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}

impl ComplaintStore for JsonFileComplaintStore {
    fn insert(&self, row: ComplaintRow) -> Result<Complaint, StorageError> {
        self.write(|state| Ok((state.insert(row)?, true)))
    }

    fn fetch(&self, id: ComplaintId) -> Result<Option<Complaint>, StorageError> {
        self.read(|state| state.fetch(id))
    }

    fn by_email(&self, customer_email: &str) -> Result<Vec<Complaint>, StorageError> {
        self.read(|state| state.by_email(customer_email))
    }

    fn all(&self) -> Result<Vec<Complaint>, StorageError> {
        self.read(StoreState::all)
    }

    fn update_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Complaint>, StorageError> {
        self.write(|state| {
            let updated = state.update_status(id, status, updated_at);
            let changed = updated.is_some();
            Ok((updated, changed))
        })
    }
}

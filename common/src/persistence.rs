//! Snapshot persistence for the notification list.
//!
//! The whole list is written as one JSON array on every change and read back
//! verbatim at startup. There are no deltas: a truncated write shows up as a
//! malformed snapshot on the next load, which [`load_snapshot`] recovers from
//! by starting empty.

use std::cell::RefCell;

use thiserror::Error;

use crate::notification::Notification;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read snapshot: {0}")]
    Read(String),
    #[error("failed to write snapshot: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed snapshot: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A single-slot string store holding the serialized snapshot.
pub trait SnapshotStorage {
    /// `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot.
    fn write(&self, contents: &str) -> Result<(), StorageError>;
}

/// In-process storage; survives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for std::rc::Rc<S> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        (**self).write(contents)
    }
}

pub fn encode_snapshot(notifications: &[Notification]) -> Result<String, SnapshotError> {
    serde_json::to_string(notifications).map_err(SnapshotError::Encode)
}

pub fn decode_snapshot(raw: &str) -> Result<Vec<Notification>, SnapshotError> {
    serde_json::from_str(raw).map_err(SnapshotError::Decode)
}

/// Load the persisted list. Missing, unreadable or malformed snapshots all
/// yield an empty list; failures are logged and never propagated.
pub fn load_snapshot(storage: &dyn SnapshotStorage) -> Vec<Notification> {
    let raw = match storage.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Notification snapshot unreadable, starting empty: {e}");
            return Vec::new();
        }
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match decode_snapshot(&raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Dropping corrupt notification snapshot: {e}");
            Vec::new()
        }
    }
}

pub fn save_snapshot(
    storage: &dyn SnapshotStorage,
    notifications: &[Notification],
) -> Result<(), SnapshotError> {
    let raw = encode_snapshot(notifications)?;
    storage.write(&raw)?;
    Ok(())
}

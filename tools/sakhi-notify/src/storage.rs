use std::io::ErrorKind;
use std::path::PathBuf;

use sakhi_common::persistence::{SnapshotStorage, StorageError};

/// Snapshot kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// `<data dir>/sakhi/notifications.json`, falling back to `/tmp`.
pub fn default_store_path() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("sakhi").join("notifications.json")
}

impl SnapshotStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Write(format!("Failed to create dir: {}", e)))?;
        }
        std::fs::write(&self.path, contents)
            .map_err(|e| StorageError::Write(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!("Saved notifications to {}", self.path.display());
        Ok(())
    }
}

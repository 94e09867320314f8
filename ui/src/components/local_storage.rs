use sakhi_common::persistence::{SnapshotStorage, StorageError};
use sakhi_common::NOTIFICATIONS_STORAGE_KEY;

/// localStorage key for the notification snapshot, overridden at compile-time
/// via SAKHI_NOTIFICATIONS_KEY.
pub fn storage_key() -> String {
    option_env!("SAKHI_NOTIFICATIONS_KEY")
        .unwrap_or(NOTIFICATIONS_STORAGE_KEY)
        .to_string()
}

/// Browser localStorage slot holding the notification snapshot.
#[derive(Debug)]
pub struct LocalStorage {
    #[allow(dead_code)] // read in WASM builds
    key: String,
    #[cfg(not(target_family = "wasm"))]
    fallback: sakhi_common::persistence::MemoryStorage,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            #[cfg(not(target_family = "wasm"))]
            fallback: Default::default(),
        }
    }
}

#[cfg(target_family = "wasm")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("No window".into()))?;
        window
            .local_storage()
            .map_err(|_| StorageError::Unavailable("No localStorage".into()))?
            .ok_or_else(|| StorageError::Unavailable("localStorage unavailable".into()))
    }
}

#[cfg(target_family = "wasm")]
impl SnapshotStorage for LocalStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|e| StorageError::Read(format!("{:?}", e)))
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(&self.key, contents)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

// Non-WASM builds keep the snapshot in memory for the session
#[cfg(not(target_family = "wasm"))]
impl SnapshotStorage for LocalStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        self.fallback.read()
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        self.fallback.write(contents)
    }
}

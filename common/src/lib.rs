pub mod display;
pub mod events;
pub mod notification;
pub mod persistence;
pub mod store;

#[cfg(feature = "std")]
pub mod center;

/// Maximum number of notifications retained (and persisted) at once.
pub const MAX_NOTIFICATIONS: usize = 20;

/// Number of notifications shown in the bell dropdown before "show all".
pub const PREVIEW_LIMIT: usize = 5;

/// Default key under which the notification snapshot is persisted.
pub const NOTIFICATIONS_STORAGE_KEY: &str = "sakhi_notifications";

pub mod app;
pub mod local_storage;
pub mod notification_bell;
pub mod notification_feed;
pub mod notification_state;

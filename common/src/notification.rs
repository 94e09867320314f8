use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of event produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    UserRegistered,
    AlertCreated,
    AlertResolved,
    DeliveryAssigned,
    DeliveryCompleted,
    StockLow,
    /// Anything else, including types written by a newer build.
    #[serde(other)]
    Other,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::UserRegistered,
        NotificationType::AlertCreated,
        NotificationType::AlertResolved,
        NotificationType::DeliveryAssigned,
        NotificationType::DeliveryCompleted,
        NotificationType::StockLow,
        NotificationType::Other,
    ];

    /// Wire name, as stored in the snapshot.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::UserRegistered => "user_registered",
            NotificationType::AlertCreated => "alert_created",
            NotificationType::AlertResolved => "alert_resolved",
            NotificationType::DeliveryAssigned => "delivery_assigned",
            NotificationType::DeliveryCompleted => "delivery_completed",
            NotificationType::StockLow => "stock_low",
            NotificationType::Other => "other",
        }
    }

    /// Parse a wire name. Unknown names are rejected (unlike deserialization,
    /// which maps them to `Other`).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Visual urgency of a notification. Has no effect on ordering or eviction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// A notification as held by the center and persisted in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    /// Creation time. Never changes after publish.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Everything a producer supplies; the center adds id, timestamp and read state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub action_url: Option<String>,
}

impl NewNotification {
    pub fn new(kind: NotificationType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            priority: Priority::default(),
            action_url: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Materialize into a stored notification.
    pub fn into_notification(self, id: String, timestamp: DateTime<Utc>) -> Notification {
        Notification {
            id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            priority: self.priority,
            timestamp,
            read: false,
            action_url: self.action_url,
        }
    }
}

/// Generate a notification id: creation millis plus a random suffix, both hex.
pub fn generate_id(timestamp: DateTime<Utc>) -> String {
    format!("{:x}-{:08x}", timestamp.timestamp_millis(), rand::random::<u32>())
}

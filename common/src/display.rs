use chrono::{DateTime, Utc};

use crate::notification::{NotificationType, Priority};

impl NotificationType {
    /// Human-readable label for badges and filters.
    pub fn label(self) -> &'static str {
        match self {
            NotificationType::UserRegistered => "Registration",
            NotificationType::AlertCreated => "Alert",
            NotificationType::AlertResolved => "Resolved",
            NotificationType::DeliveryAssigned => "Delivery",
            NotificationType::DeliveryCompleted => "Delivered",
            NotificationType::StockLow => "Stock",
            NotificationType::Other => "Notice",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NotificationType::UserRegistered => "👤",
            NotificationType::AlertCreated => "⚠️",
            NotificationType::AlertResolved => "✅",
            NotificationType::DeliveryAssigned => "🚚",
            NotificationType::DeliveryCompleted => "📦",
            NotificationType::StockLow => "📉",
            NotificationType::Other => "🔔",
        }
    }
}

impl Priority {
    pub fn css_class(self) -> &'static str {
        match self {
            Priority::High => "priority-high",
            Priority::Medium => "priority-medium",
            Priority::Low => "priority-low",
        }
    }
}

/// Text for the unread badge; empty when there is nothing unread.
pub fn format_unread_badge(count: usize) -> String {
    match count {
        0 => String::new(),
        1..=9 => count.to_string(),
        _ => "9+".into(),
    }
}

/// Short relative time ("5m ago"); falls back to a date after a week.
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds();
    if secs < 60 {
        // Includes small clock skew into the future
        return "just now".into();
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }
    timestamp.format("%d %b %Y").to_string()
}

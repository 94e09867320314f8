//! Constructors used by feature modules to announce events.
//!
//! Each helper fixes the notification type, title, default priority and the
//! deep link the bell navigates to.

use crate::notification::{NewNotification, NotificationType, Priority};

pub const REGISTRY_PATH: &str = "/registry";
pub const ALERTS_PATH: &str = "/alerts";
pub const DELIVERIES_PATH: &str = "/deliveries";
pub const INVENTORY_PATH: &str = "/inventory";

/// Map a health-alert severity label to a notification priority.
pub fn priority_for_severity(severity: &str) -> Priority {
    match severity.trim().to_ascii_lowercase().as_str() {
        "critical" | "high" => Priority::High,
        "medium" | "moderate" => Priority::Medium,
        _ => Priority::Low,
    }
}

pub fn user_registered(name: &str) -> NewNotification {
    NewNotification::new(
        NotificationType::UserRegistered,
        "New registration",
        format!("{name} has been added to the registry"),
    )
    .with_priority(Priority::Medium)
    .with_action_url(REGISTRY_PATH)
}

pub fn alert_created(alert_id: &str, woman_name: &str, severity: &str) -> NewNotification {
    NewNotification::new(
        NotificationType::AlertCreated,
        "New health alert",
        format!("{severity} alert raised for {woman_name}"),
    )
    .with_priority(priority_for_severity(severity))
    .with_action_url(format!("{ALERTS_PATH}/{alert_id}"))
}

pub fn alert_resolved(alert_id: &str, woman_name: &str) -> NewNotification {
    NewNotification::new(
        NotificationType::AlertResolved,
        "Alert resolved",
        format!("Alert for {woman_name} has been resolved"),
    )
    .with_priority(Priority::Low)
    .with_action_url(format!("{ALERTS_PATH}/{alert_id}"))
}

pub fn delivery_assigned(order_id: &str, partner_name: &str) -> NewNotification {
    NewNotification::new(
        NotificationType::DeliveryAssigned,
        "Delivery assigned",
        format!("Order {order_id} assigned to {partner_name}"),
    )
    .with_priority(Priority::Medium)
    .with_action_url(format!("{DELIVERIES_PATH}/{order_id}"))
}

pub fn delivery_completed(order_id: &str, partner_name: &str) -> NewNotification {
    NewNotification::new(
        NotificationType::DeliveryCompleted,
        "Delivery completed",
        format!("{partner_name} delivered order {order_id}"),
    )
    .with_priority(Priority::Low)
    .with_action_url(format!("{DELIVERIES_PATH}/{order_id}"))
}

/// Out of stock is high priority; merely below threshold is medium.
pub fn stock_low(item_name: &str, remaining: u32, threshold: u32) -> NewNotification {
    let (priority, message) = if remaining == 0 {
        (Priority::High, format!("{item_name} is out of stock"))
    } else {
        (
            Priority::Medium,
            format!("{item_name} is low: {remaining} left (threshold {threshold})"),
        )
    };
    NewNotification::new(NotificationType::StockLow, "Low stock", message)
        .with_priority(priority)
        .with_action_url(INVENTORY_PATH)
}

use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use sakhi_common::center::NotificationCenter;
use sakhi_common::display::{format_relative, format_unread_badge};
use sakhi_common::notification::Notification;
use sakhi_common::PREVIEW_LIMIT;

use super::app::Route;
use super::notification_state::{use_notification_center, use_notifications};

/// Mark a notification read and follow its deep link, if any.
/// Returns true when a navigation happened.
pub fn open_notification(
    center: &NotificationCenter,
    nav: &Navigator,
    notification: &Notification,
) -> bool {
    center.mark_as_read(&notification.id);

    let Some(url) = notification.action_url.as_deref() else {
        return false;
    };
    match url.parse::<Route>() {
        Ok(route) => {
            nav.push(route);
            true
        }
        Err(e) => {
            tracing::warn!("Ignoring notification link {url}: {e}");
            false
        }
    }
}

/// A single notification line, shared by the bell dropdown and the feed.
#[component]
pub fn NotificationRow(
    notification: Notification,
    now: DateTime<Utc>,
    onactivate: EventHandler<Notification>,
) -> Element {
    let state_class = if notification.read { "read" } else { "unread" };
    let priority_class = notification.priority.css_class();
    let icon = notification.kind.icon();
    let label = notification.kind.label();
    let title = notification.title.clone();
    let message = notification.message.clone();
    let when = format_relative(notification.timestamp, now);

    rsx! {
        li {
            class: "notification-item {state_class}",
            onclick: move |_| onactivate.call(notification.clone()),
            span { class: "priority-dot {priority_class}" }
            span { class: "notification-icon", "{icon}" }
            div { class: "notification-body",
                div { class: "notification-header",
                    span { class: "notification-title", "{title}" }
                    span { class: "notification-kind", "{label}" }
                }
                p { class: "notification-message", "{message}" }
                span { class: "notification-time", "{when}" }
            }
        }
    }
}

#[component]
pub fn NotificationBell() -> Element {
    let center = use_notification_center();
    let snapshot = use_notifications();
    let nav = use_navigator();
    let mut open = use_signal(|| false);
    let mut show_all = use_signal(|| false);

    let snap = snapshot.read();
    let unread = snap.unread_count;
    let badge = format_unread_badge(unread);
    let total = snap.notifications.len();
    let limit = if show_all() { total } else { PREVIEW_LIMIT };
    let visible: Vec<Notification> = snap.notifications.iter().take(limit).cloned().collect();
    drop(snap);
    let now = Utc::now();

    let center_all = center.clone();

    rsx! {
        div { class: "notification-bell",
            button {
                class: "bell-button",
                title: "Notifications",
                onclick: move |_| {
                    let was_open = open();
                    open.set(!was_open);
                    if was_open {
                        show_all.set(false);
                    }
                },
                "🔔"
                if !badge.is_empty() {
                    span { class: "bell-badge", "{badge}" }
                }
            }

            if open() {
                div { class: "notification-panel",
                    div { class: "panel-header",
                        h3 { "Notifications" }
                        if unread > 0 {
                            button {
                                class: "mark-all",
                                onclick: move |_| {
                                    center_all.mark_all_as_read();
                                },
                                "Mark all as read"
                            }
                        }
                    }

                    if visible.is_empty() {
                        p { class: "empty-state", "No notifications yet." }
                    } else {
                        ul { class: "notification-list",
                            {visible.into_iter().map(|n| {
                                let center = center.clone();
                                let key = n.id.clone();
                                rsx! {
                                    NotificationRow {
                                        key: "{key}",
                                        notification: n,
                                        now,
                                        onactivate: move |n: Notification| {
                                            if open_notification(&center, &nav, &n) {
                                                open.set(false);
                                                show_all.set(false);
                                            }
                                        },
                                    }
                                }
                            })}
                        }
                    }

                    if total > PREVIEW_LIMIT {
                        button {
                            class: "show-all",
                            onclick: move |_| {
                                let expanded = show_all();
                                show_all.set(!expanded);
                            },
                            if show_all() { "Show less" } else { "Show all ({total})" }
                        }
                    }
                }
            }
        }
    }
}

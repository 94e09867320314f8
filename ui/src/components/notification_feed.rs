use chrono::Utc;
use dioxus::prelude::*;

use sakhi_common::notification::Notification;

use super::notification_bell::{open_notification, NotificationRow};
use super::notification_state::{use_notification_center, use_notifications};

/// True when `url` is `section` itself or a path below it.
fn in_section(url: &str, section: &str) -> bool {
    url.strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Full notification list. With `section` set, only notifications linking
/// under that path prefix (e.g. "/alerts") are shown.
#[component]
pub fn NotificationFeed(section: Option<String>) -> Element {
    let center = use_notification_center();
    let snapshot = use_notifications();
    let nav = use_navigator();

    let snap = snapshot.read();
    let unread = snap.unread_count;
    let list: Vec<Notification> = snap
        .notifications
        .iter()
        .filter(|n| match &section {
            Some(prefix) => n
                .action_url
                .as_deref()
                .is_some_and(|url| in_section(url, prefix)),
            None => true,
        })
        .cloned()
        .collect();
    drop(snap);
    let now = Utc::now();

    let center_all = center.clone();

    rsx! {
        div { class: "notification-feed",
            div { class: "feed-header",
                h2 { "Notifications" }
                span { class: "feed-unread", "{unread} unread" }
                if unread > 0 {
                    button {
                        onclick: move |_| {
                            center_all.mark_all_as_read();
                        },
                        "Mark all as read"
                    }
                }
            }
            if list.is_empty() {
                p { class: "empty-state", "Nothing to show here yet." }
            } else {
                ul { class: "notification-list",
                    {list.into_iter().map(|n| {
                        let center = center.clone();
                        let key = n.id.clone();
                        rsx! {
                            NotificationRow {
                                key: "{key}",
                                notification: n,
                                now,
                                onactivate: move |n: Notification| {
                                    open_notification(&center, &nav, &n);
                                },
                            }
                        }
                    })}
                }
            }
        }
    }
}

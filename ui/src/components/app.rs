use dioxus::prelude::*;

use sakhi_common::center::NotificationCenter;
use sakhi_common::events::{ALERTS_PATH, DELIVERIES_PATH, INVENTORY_PATH, REGISTRY_PATH};

use super::local_storage::{storage_key, LocalStorage};
use super::notification_bell::NotificationBell;
use super::notification_feed::NotificationFeed;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Home {},
    #[route("/:..segments")]
    Section { segments: Vec<String> },
}

/// Dashboard sections reachable from the header, as (label, path).
const SECTIONS: [(&str, &str); 4] = [
    ("Alerts", ALERTS_PATH),
    ("Registry", REGISTRY_PATH),
    ("Deliveries", DELIVERIES_PATH),
    ("Inventory", INVENTORY_PATH),
];

fn section_route(path: &str) -> Route {
    Route::Section {
        segments: path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

#[component]
pub fn App() -> Element {
    // One center for the whole app; every view subscribes to it.
    use_context_provider(|| NotificationCenter::load(LocalStorage::new(storage_key())));

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    let nav = use_navigator();

    rsx! {
        div { class: "sakhi-app",
            header { class: "app-header",
                div { class: "header-top",
                    h1 { "SAKHI" }
                    NotificationBell {}
                }
                p { "Maternal and child health coordination" }
                nav {
                    button {
                        onclick: move |_| { nav.push(Route::Home {}); },
                        "Overview"
                    }
                    {SECTIONS.iter().map(|&(label, path)| rsx! {
                        button {
                            key: "{path}",
                            onclick: move |_| { nav.push(section_route(path)); },
                            "{label}"
                        }
                    })}
                }
            }
            main {
                Outlet::<Route> {}
            }
        }
    }
}

/// Route component: the full notification feed.
#[component]
fn Home() -> Element {
    rsx! { NotificationFeed {} }
}

/// Route component: a dashboard section. The section's own pages live in
/// the admin portal; here it shows the notifications that link into it.
#[component]
fn Section(segments: Vec<String>) -> Element {
    let Some(first) = segments.first().cloned() else {
        return rsx! { NotificationFeed {} };
    };
    let heading = SECTIONS
        .iter()
        .find(|(_, path)| path.trim_start_matches('/') == first)
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| first.clone());
    let detail = segments.get(1).cloned();

    rsx! {
        div { class: "section-view",
            h2 { "{heading}" }
            if let Some(id) = detail {
                p { class: "section-detail", "Record {id}" }
            }
            NotificationFeed { section: format!("/{first}") }
        }
    }
}

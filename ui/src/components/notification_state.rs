use std::rc::Rc;

use dioxus::prelude::*;

use sakhi_common::center::{NotificationCenter, NotificationSnapshot};

/// The app-wide notification center, provided once by `App`.
pub fn use_notification_center() -> NotificationCenter {
    use_context::<NotificationCenter>()
}

/// Current notification state for this component.
///
/// Subscribes to the center when the component mounts; the subscription is
/// held by the hook and released when the component unmounts. Components
/// never keep their own unread counters, they re-render from the snapshot.
pub fn use_notifications() -> Signal<NotificationSnapshot> {
    let center = use_notification_center();
    let mut snapshot = use_signal(|| center.snapshot());
    use_hook(|| {
        Rc::new(center.subscribe(move |latest: &NotificationSnapshot| {
            snapshot.set(latest.clone());
        }))
    });
    snapshot
}

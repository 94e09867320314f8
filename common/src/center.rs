//! The notification center: single authoritative notification store and
//! fan-out point.
//!
//! Producers call [`NotificationCenter::publish`]; views call
//! [`NotificationCenter::subscribe`] and receive a full
//! [`NotificationSnapshot`] after every change instead of keeping their own
//! counters. Everything runs on one thread; handles are `Rc`-based.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::Utc;

use crate::notification::{generate_id, NewNotification, Notification};
use crate::persistence::{load_snapshot, save_snapshot, SnapshotStorage};
use crate::store::NotificationStore;

/// Full state delivered to subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationSnapshot {
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationSnapshot {
    fn of(store: &NotificationStore) -> Self {
        Self {
            notifications: store.to_vec(),
            unread_count: store.unread_count(),
        }
    }
}

type Callback = Rc<RefCell<dyn FnMut(&NotificationSnapshot)>>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl Subscribers {
    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

struct Inner {
    store: RefCell<NotificationStore>,
    subscribers: Rc<RefCell<Subscribers>>,
    storage: Box<dyn SnapshotStorage>,
    /// Set while callbacks run; nested changes only flag `pending`.
    dispatching: Cell<bool>,
    pending: Cell<bool>,
}

/// Cloning yields another handle to the same center.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Rc<Inner>,
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("len", &self.inner.store.borrow().len())
            .field("unread", &self.unread_count())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl PartialEq for NotificationCenter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl NotificationCenter {
    /// Start empty, ignoring anything already persisted.
    pub fn new(storage: impl SnapshotStorage + 'static) -> Self {
        Self::with_store(NotificationStore::new(), Box::new(storage))
    }

    /// Start from the persisted snapshot, or empty if there is none (or it is
    /// corrupt).
    pub fn load(storage: impl SnapshotStorage + 'static) -> Self {
        let loaded = load_snapshot(&storage);
        let store = NotificationStore::from_notifications(loaded);
        tracing::debug!(
            "Loaded {} notifications ({} unread)",
            store.len(),
            store.unread_count()
        );
        Self::with_store(store, Box::new(storage))
    }

    fn with_store(store: NotificationStore, storage: Box<dyn SnapshotStorage>) -> Self {
        Self {
            inner: Rc::new(Inner {
                store: RefCell::new(store),
                subscribers: Rc::new(RefCell::new(Subscribers::default())),
                storage,
                dispatching: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    /// Register a callback that receives the full state after every change,
    /// in subscription order. Delivery stops when the returned handle is
    /// dropped.
    pub fn subscribe(&self, callback: impl FnMut(&NotificationSnapshot) + 'static) -> Subscription {
        let mut subs = self.inner.subscribers.borrow_mut();
        let id = subs.next_id;
        subs.next_id += 1;
        let callback: Callback = Rc::new(RefCell::new(callback));
        subs.entries.push((id, callback));
        Subscription {
            id,
            subscribers: Rc::downgrade(&self.inner.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().entries.len()
    }

    /// Add a notification, evicting the oldest if the store is full, then
    /// persist and notify subscribers. Returns the stored notification.
    pub fn publish(&self, new: NewNotification) -> Notification {
        let notification = {
            let mut store = self.inner.store.borrow_mut();
            let timestamp = Utc::now();
            let mut id = generate_id(timestamp);
            while store.contains(&id) {
                id = generate_id(timestamp);
            }
            let notification = new.into_notification(id, timestamp);
            if let Some(evicted) = store.insert(notification.clone()) {
                tracing::debug!("Evicted notification {}", evicted.id);
            }
            notification
        };
        tracing::debug!(
            "Published {} notification {}",
            notification.kind.as_str(),
            notification.id
        );
        self.commit();
        notification
    }

    /// Returns false if the id is unknown or already read; nothing is
    /// persisted or broadcast in that case.
    pub fn mark_as_read(&self, id: &str) -> bool {
        let changed = self.inner.store.borrow_mut().mark_as_read(id);
        if changed {
            tracing::debug!("Marked notification {id} as read");
            self.commit();
        }
        changed
    }

    /// Returns how many notifications changed.
    pub fn mark_all_as_read(&self) -> usize {
        let flipped = self.inner.store.borrow_mut().mark_all_as_read();
        if flipped > 0 {
            tracing::debug!("Marked {flipped} notifications as read");
            self.commit();
        }
        flipped
    }

    pub fn clear(&self) {
        let was_empty = {
            let mut store = self.inner.store.borrow_mut();
            let was_empty = store.is_empty();
            store.clear();
            was_empty
        };
        if !was_empty {
            self.commit();
        }
    }

    pub fn unread_count(&self) -> usize {
        self.inner.store.borrow().unread_count()
    }

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.store.borrow().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.inner.store.borrow().get(id).cloned()
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot::of(&self.inner.store.borrow())
    }

    /// Persist the current state, then broadcast it. No store borrow is held
    /// while callbacks run, so they may call back into the center.
    fn commit(&self) {
        let notifications = self.notifications();
        if let Err(e) = save_snapshot(self.inner.storage.as_ref(), &notifications) {
            tracing::error!("Failed to persist notifications: {e}");
        }
        self.broadcast();
    }

    /// Deliver the current state to every subscriber. A change made from
    /// inside a callback is delivered as a fresh round once the current one
    /// finishes, so each subscriber's last snapshot is the current state.
    fn broadcast(&self) {
        if self.inner.dispatching.get() {
            self.inner.pending.set(true);
            return;
        }
        let _guard = DispatchGuard::enter(&self.inner);
        loop {
            self.inner.pending.set(false);
            let snapshot = self.snapshot();
            // Copy the list out so callbacks can subscribe or unsubscribe
            // freely. A panicking callback unwinds through here and later
            // subscribers miss this snapshot.
            let callbacks: Vec<Callback> = self
                .inner
                .subscribers
                .borrow()
                .entries
                .iter()
                .map(|(_, cb)| cb.clone())
                .collect();
            for callback in callbacks {
                (&mut *callback.borrow_mut())(&snapshot);
            }
            if !self.inner.pending.get() {
                break;
            }
        }
    }
}

/// Clears the dispatch flags on exit, including when a callback panics.
struct DispatchGuard<'a> {
    inner: &'a Inner,
}

impl<'a> DispatchGuard<'a> {
    fn enter(inner: &'a Inner) -> Self {
        inner.dispatching.set(true);
        Self { inner }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.inner.dispatching.set(false);
        self.inner.pending.set(false);
    }
}

/// Keeps a subscription alive. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<RefCell<Subscribers>>,
}

impl Subscription {
    /// Stop delivery now rather than when the handle goes out of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subs) = self.subscribers.upgrade() {
            if let Ok(mut subs) = subs.try_borrow_mut() {
                subs.remove(self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{NotificationType, Priority};
    use crate::persistence::{MemoryStorage, StorageError};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn draft(title: &str) -> NewNotification {
        NewNotification::new(NotificationType::Other, title, "body")
    }

    fn center() -> (NotificationCenter, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (NotificationCenter::new(storage.clone()), storage)
    }

    #[test]
    fn publish_twenty_one_keeps_last_twenty() {
        let (center, _) = center();
        for i in 1..=21 {
            center.publish(draft(&format!("N{i}")));
        }
        let titles: Vec<_> = center.notifications().into_iter().map(|n| n.title).collect();
        let expected: Vec<_> = (2..=21).rev().map(|i| format!("N{i}")).collect();
        assert_eq!(titles, expected);
        assert_eq!(center.unread_count(), 20);
    }

    #[test]
    fn unread_high_priority_is_evicted_like_any_other() {
        let (center, _) = center();
        let urgent = center.publish(draft("urgent").with_priority(Priority::High));
        for i in 0..20 {
            center.publish(draft(&format!("low {i}")).with_priority(Priority::Low));
        }
        assert!(center.get(&urgent.id).is_none());
        assert_eq!(center.unread_count(), 20);
    }

    #[test]
    fn publish_three_then_mark_all() {
        let (center, _) = center();
        for i in 0..3 {
            center.publish(draft(&format!("N{i}")));
        }
        assert_eq!(center.unread_count(), 3);
        assert_eq!(center.mark_all_as_read(), 3);
        assert_eq!(center.unread_count(), 0);
        assert!(center.notifications().iter().all(|n| n.read));
    }

    #[test]
    fn mark_as_read_twice_does_not_underflow() {
        let (center, _) = center();
        let n = center.publish(draft("a"));
        center.publish(draft("b"));
        assert!(center.mark_as_read(&n.id));
        assert!(!center.mark_as_read(&n.id));
        assert_eq!(center.unread_count(), 1);
        assert!(center.get(&n.id).unwrap().read);
    }

    #[test]
    fn published_notification_is_fresh() {
        let (center, _) = center();
        let n = center.publish(draft("x").with_priority(Priority::High).with_action_url("/alerts"));
        assert!(!n.read);
        assert_eq!(n.priority, Priority::High);
        assert_eq!(n.action_url.as_deref(), Some("/alerts"));
        assert_eq!(center.get(&n.id), Some(n));
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (center, storage) = center();
        let n = center.publish(draft("a"));
        let reloaded = NotificationCenter::load(storage.clone());
        assert_eq!(reloaded.notifications(), center.notifications());
        assert_eq!(reloaded.unread_count(), 1);

        center.mark_as_read(&n.id);
        let reloaded = NotificationCenter::load(storage.clone());
        assert_eq!(reloaded.unread_count(), 0);
        assert!(reloaded.get(&n.id).unwrap().read);

        center.clear();
        assert!(NotificationCenter::load(storage).notifications().is_empty());
    }

    struct ReadOnlyStorage;

    impl SnapshotStorage for ReadOnlyStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _contents: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("quota exceeded".into()))
        }
    }

    #[test]
    fn failed_writes_keep_memory_state_and_notify() {
        let center = NotificationCenter::new(ReadOnlyStorage);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = center.subscribe(move |snap| s.borrow_mut().push(snap.unread_count));

        let first = center.publish(draft("a"));
        center.publish(draft("b"));
        center.publish(draft("c"));
        assert_eq!(center.notifications().len(), 3);
        assert_eq!(center.unread_count(), 3);

        assert!(center.mark_as_read(&first.id));
        assert!(center.get(&first.id).unwrap().read);
        assert_eq!(center.unread_count(), 2);

        assert_eq!(center.mark_all_as_read(), 2);
        assert_eq!(center.unread_count(), 0);
        assert!(center.notifications().iter().all(|n| n.read));

        assert_eq!(*seen.borrow(), vec![1, 2, 3, 2, 0]);
    }

    #[test]
    fn load_from_corrupt_storage_starts_empty() {
        let center = NotificationCenter::load(MemoryStorage::with_contents("[{\"id\":"));
        assert!(center.notifications().is_empty());
        assert_eq!(center.unread_count(), 0);
        center.publish(draft("after recovery"));
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn subscribers_fire_in_order_with_full_state() {
        let (center, _) = center();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        let _first = center.subscribe(move |s| l.borrow_mut().push(("first", s.unread_count)));
        let l = log.clone();
        let _second = center.subscribe(move |s| l.borrow_mut().push(("second", s.unread_count)));

        let n = center.publish(draft("a"));
        center.mark_as_read(&n.id);

        assert_eq!(
            *log.borrow(),
            vec![("first", 1), ("second", 1), ("first", 0), ("second", 0)]
        );
    }

    #[test]
    fn noop_mutations_do_not_notify() {
        let (center, _) = center();
        let calls = Rc::new(RefCell::new(0));
        let c = calls.clone();
        let _sub = center.subscribe(move |_| *c.borrow_mut() += 1);

        center.mark_as_read("missing");
        center.mark_all_as_read();
        center.clear();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let (center, _) = center();
        let calls = Rc::new(RefCell::new(0));
        let c = calls.clone();
        let sub = center.subscribe(move |_| *c.borrow_mut() += 1);
        assert_eq!(center.subscriber_count(), 1);

        center.publish(draft("a"));
        sub.unsubscribe();
        assert_eq!(center.subscriber_count(), 0);

        center.publish(draft("b"));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn subscription_outliving_center_is_harmless() {
        let (center, _) = center();
        let sub = center.subscribe(|_| {});
        drop(center);
        drop(sub);
    }

    #[test]
    fn panicking_subscriber_halts_later_subscribers() {
        let (center, _) = center();
        let reached = Rc::new(RefCell::new(false));

        let _bad = center.subscribe(|_| panic!("subscriber failed"));
        let r = reached.clone();
        let _good = center.subscribe(move |_| *r.borrow_mut() = true);

        let result = catch_unwind(AssertUnwindSafe(|| center.publish(draft("a"))));
        assert!(result.is_err());
        assert!(!*reached.borrow());

        // State was committed before delivery and the center remains usable.
        assert_eq!(center.unread_count(), 1);
        assert_eq!(center.notifications().len(), 1);
    }

    #[test]
    fn callback_may_mutate_center() {
        let (center, _) = center();
        let handle = center.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _auto_read = center.subscribe(move |snap| {
            s.borrow_mut().push(snap.unread_count);
            if let Some(n) = snap.notifications.iter().find(|n| !n.read) {
                handle.mark_as_read(&n.id);
            }
        });
        let observed = Rc::new(RefCell::new(Vec::new()));
        let o = observed.clone();
        let _observer = center.subscribe(move |snap| o.borrow_mut().push(snap.clone()));

        center.publish(draft("a"));
        assert_eq!(center.unread_count(), 0);
        assert_eq!(*seen.borrow(), vec![1, 0]);

        // Every subscriber ends on the current state.
        assert_eq!(observed.borrow().last(), Some(&center.snapshot()));
        assert_eq!(observed.borrow().last().unwrap().unread_count, 0);
    }

    #[test]
    fn nested_changes_are_delivered_after_the_current_round() {
        let (center, _) = center();
        let handle = center.clone();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let _first = center.subscribe(move |snap| {
            o.borrow_mut().push(("first", snap.notifications.len()));
            if snap.notifications.len() == 1 {
                handle.publish(draft("follow-up"));
            }
        });
        let o = order.clone();
        let _second = center.subscribe(move |snap| o.borrow_mut().push(("second", snap.notifications.len())));

        center.publish(draft("a"));
        assert_eq!(
            *order.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn dispatch_recovers_after_panicking_subscriber() {
        let (center, _) = center();
        let fail = Rc::new(Cell::new(true));
        let calls = Rc::new(Cell::new(0));

        let f = fail.clone();
        let c = calls.clone();
        let _flaky = center.subscribe(move |_| {
            c.set(c.get() + 1);
            if f.get() {
                panic!("subscriber failed");
            }
        });

        assert!(catch_unwind(AssertUnwindSafe(|| center.publish(draft("a")))).is_err());
        fail.set(false);
        center.publish(draft("b"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn subscriber_added_during_dispatch_starts_next_change() {
        let (center, _) = center();
        let handle = center.clone();
        let late_calls = Rc::new(RefCell::new(0));
        let held = Rc::new(RefCell::new(Vec::new()));

        let lc = late_calls.clone();
        let h = held.clone();
        let _adder = center.subscribe(move |_| {
            if h.borrow().is_empty() {
                let lc = lc.clone();
                let sub = handle.subscribe(move |_| *lc.borrow_mut() += 1);
                h.borrow_mut().push(sub);
            }
        });

        center.publish(draft("a"));
        assert_eq!(*late_calls.borrow(), 0);
        center.publish(draft("b"));
        assert_eq!(*late_calls.borrow(), 1);
    }
}

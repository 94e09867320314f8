use std::collections::{HashSet, VecDeque};

use crate::notification::Notification;
use crate::MAX_NOTIFICATIONS;

/// Bounded, newest-first list of notifications with an explicitly maintained
/// unread counter.
///
/// Every mutation updates `unread` in the same step as the list, so the
/// counter always equals the number of retained unread notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationStore {
    items: VecDeque<Notification>,
    unread: usize,
    capacity: usize,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_NOTIFICATIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            unread: 0,
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from a loaded snapshot (newest first). Repeated ids keep only
    /// their first (newest) entry, anything past capacity is dropped and the
    /// unread counter is recomputed.
    pub fn from_notifications(notifications: Vec<Notification>) -> Self {
        let mut store = Self::new();
        let mut seen = HashSet::new();
        store.items = notifications
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .take(store.capacity)
            .collect();
        store.unread = store.items.iter().filter(|n| !n.read).count();
        store
    }

    /// Insert at the front, evicting the oldest entry when over capacity.
    pub fn insert(&mut self, notification: Notification) -> Option<Notification> {
        if !notification.read {
            self.unread += 1;
        }
        self.items.push_front(notification);

        if self.items.len() <= self.capacity {
            return None;
        }
        let evicted = self.items.pop_back()?;
        if !evicted.read {
            self.unread = self.unread.saturating_sub(1);
        }
        Some(evicted)
    }

    /// Returns true only if an unread notification was flipped to read.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Returns how many notifications changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut flipped = 0;
        for n in self.items.iter_mut().filter(|n| !n.read) {
            n.read = true;
            flipped += 1;
        }
        self.unread = 0;
        flipped
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.unread = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|n| n.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }
}

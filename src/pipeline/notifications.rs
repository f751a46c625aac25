//! Bounded notification store with an unread counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Fixed-capacity notification list, newest first
///
/// `unread_count` counts deliveries not yet acknowledged. Eviction does not
/// touch it; only `mark_as_read`, `mark_all_as_read` and `clear` do, and it
/// never goes below zero.
#[derive(Debug)]
pub struct NotificationStore {
    notifications: VecDeque<Notification>,
    capacity: usize,
    unread_count: usize,
    next_id: u64,
}

impl NotificationStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            notifications: VecDeque::with_capacity(capacity),
            capacity,
            unread_count: 0,
            next_id: 1,
        }
    }

    pub fn add(&mut self, draft: NotificationDraft, created_at: DateTime<Utc>) -> Notification {
        let notification = Notification {
            id: format!("ntf-{:06}", self.next_id),
            severity: draft.severity,
            title: draft.title,
            message: draft.message,
            created_at,
            read: false,
        };
        self.next_id += 1;

        self.notifications.push_front(notification.clone());
        self.notifications.truncate(self.capacity);
        self.unread_count += 1;
        notification
    }

    /// Mark one notification read
    ///
    /// Returns `true` only on the first successful call for `id`; repeated
    /// calls and unknown ids are no-ops.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for n in self.notifications.iter_mut() {
            n.read = true;
        }
        self.unread_count = 0;
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.unread_count = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Newest first
    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft {
            severity: Severity::Info,
            title: title.to_string(),
            message: "Order confirmed".to_string(),
        }
    }

    #[test]
    fn test_unread_count_after_marks() {
        let mut store = NotificationStore::default();
        let ids: Vec<String> = (0..10)
            .map(|i| store.add(draft(&format!("n{}", i)), Utc::now()).id)
            .collect();

        for id in &ids[..4] {
            assert!(store.mark_as_read(id));
        }

        assert_eq!(store.unread_count(), 6);
    }

    #[test]
    fn test_mark_as_read_is_idempotent() {
        let mut store = NotificationStore::default();
        let id = store.add(draft("once"), Utc::now()).id;
        store.add(draft("other"), Utc::now());

        assert!(store.mark_as_read(&id));
        assert!(!store.mark_as_read(&id));
        assert!(!store.mark_as_read(&id));

        assert_eq!(store.unread_count(), 1);
        assert!(store.get(&id).unwrap().read);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = NotificationStore::default();
        store.add(draft("a"), Utc::now());

        assert!(!store.mark_as_read("ntf-999999"));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_mark_all_then_count_stays_zero() {
        let mut store = NotificationStore::default();
        let n1 = store.add(draft("n1"), Utc::now()).id;
        store.add(draft("n2"), Utc::now());
        store.add(draft("n3"), Utc::now());

        store.mark_all_as_read();

        assert_eq!(store.unread_count(), 0);
        assert!(store.snapshot().iter().all(|n| n.read));

        // Already read: no decrement below zero
        assert!(!store.mark_as_read(&n1));
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_capacity_and_clear() {
        let mut store = NotificationStore::default();
        for i in 0..60 {
            store.add(draft(&format!("n{}", i)), Utc::now());
        }

        assert_eq!(store.len(), 50);
        assert_eq!(store.snapshot()[0].title, "n59");
        assert_eq!(store.snapshot()[49].title, "n10");
        assert_eq!(store.unread_count(), 60);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
    }
}

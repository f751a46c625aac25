//! Bounded, newest-first realtime event buffer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sale,
    Order,
    User,
    Alert,
    Milestone,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Sale => "sale",
            EventKind::Order => "order",
            EventKind::User => "user",
            EventKind::Alert => "alert",
            EventKind::Milestone => "milestone",
        }
    }
}

/// Event content before the buffer stamps it with an id and time
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    pub id: String,
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Fixed-capacity event store, newest first
///
/// Not synchronised on its own: the owner serialises all writers (see
/// `LiveFeed`).
#[derive(Debug)]
pub struct RealtimeEventBuffer {
    events: VecDeque<RealtimeEvent>,
    capacity: usize,
    next_id: u64,
}

impl RealtimeEventBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Stamp and prepend `draft`, evicting the oldest entries beyond capacity
    pub fn push(&mut self, draft: EventDraft, created_at: DateTime<Utc>) -> RealtimeEvent {
        let event = RealtimeEvent {
            id: format!("evt-{:06}", self.next_id),
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            value: draft.value,
            created_at,
        };
        self.next_id += 1;

        self.events.push_front(event.clone());
        self.events.truncate(self.capacity);
        event
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Newest first
    pub fn snapshot(&self) -> Vec<RealtimeEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn latest(&self, limit: usize) -> Vec<RealtimeEvent> {
        self.events.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RealtimeEventBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

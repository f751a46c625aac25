//! Live feed state: event buffer, notification store and refresh bookkeeping
//!
//! One `LiveFeed` is built at bootstrap and shared by `Arc` with the
//! scheduler and whatever serves the presentation layer. Every mutation goes
//! through a single mutex, so scheduled ticks and manual refreshes can
//! interleave without losing updates.

use super::events::{EventDraft, RealtimeEvent, RealtimeEventBuffer};
use super::notifications::{Notification, NotificationDraft, NotificationStore};
use super::synth;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::random::RandomSource;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Work executed on every scheduler tick
///
/// Implementations must not call back into the scheduler that drives them.
pub trait TickAction: Send + Sync + 'static {
    fn run_tick(&self) -> Result<()>;

    /// Time of the last completed refresh, if the action tracks one
    fn last_triggered_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// What one refresh produced
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub event: RealtimeEvent,
    pub notification: Option<Notification>,
    /// Invalidation generation after this refresh
    pub generation: u64,
}

struct FeedState {
    events: RealtimeEventBuffer,
    notifications: NotificationStore,
    last_triggered_at: Option<DateTime<Utc>>,
    rng: Box<dyn RandomSource>,
}

pub struct LiveFeed {
    state: Mutex<FeedState>,
    invalidation: watch::Sender<u64>,
    notification_probability: f64,
    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl LiveFeed {
    pub fn new(config: &DashboardConfig, rng: Box<dyn RandomSource>) -> Self {
        Self::new_with_timestamp_fn(config, rng, Box::new(Utc::now))
    }

    pub fn new_with_timestamp_fn(
        config: &DashboardConfig,
        rng: Box<dyn RandomSource>,
        now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        let (invalidation, _) = watch::channel(0);
        Self {
            state: Mutex::new(FeedState {
                events: RealtimeEventBuffer::new(config.event_capacity),
                notifications: NotificationStore::new(config.notification_capacity),
                last_triggered_at: None,
                rng,
            }),
            invalidation,
            notification_probability: config.notification_probability,
            now_fn,
        }
    }

    // A panicking tick must not wedge the stores
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One refresh: invalidate cached aggregates, stamp `last_triggered_at`,
    /// publish one synthetic event and, with the configured probability, a
    /// matching notification
    ///
    /// Used for both scheduled ticks and user-triggered refreshes.
    pub fn refresh(&self) -> RefreshReport {
        let mut state = self.lock();
        let now = (self.now_fn)();

        self.invalidation.send_modify(|generation| *generation += 1);
        let generation = *self.invalidation.borrow();
        state.last_triggered_at = Some(now);

        let draft = synth::random_event(state.rng.as_mut());
        let wants_notification = state.rng.chance(self.notification_probability);

        let notification = if wants_notification {
            Some(state.notifications.add(synth::notification_for(&draft), now))
        } else {
            None
        };
        let event = state.events.push(draft, now);

        log::debug!(
            "🔄 Refresh #{}: {} event {:?}{}",
            generation,
            event.kind.as_str(),
            event.description,
            if notification.is_some() { " (+notification)" } else { "" }
        );

        RefreshReport {
            event,
            notification,
            generation,
        }
    }

    /// Receiver that changes every time cached aggregates go stale
    pub fn subscribe_invalidation(&self) -> watch::Receiver<u64> {
        self.invalidation.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.invalidation.borrow()
    }

    pub fn push_event(&self, draft: EventDraft) -> RealtimeEvent {
        let now = (self.now_fn)();
        self.lock().events.push(draft, now)
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Newest first
    pub fn events(&self) -> Vec<RealtimeEvent> {
        self.lock().events.snapshot()
    }

    pub fn recent_events(&self, limit: usize) -> Vec<RealtimeEvent> {
        self.lock().events.latest(limit)
    }

    pub fn add_notification(&self, draft: NotificationDraft) -> Notification {
        let now = (self.now_fn)();
        self.lock().notifications.add(draft, now)
    }

    pub fn mark_as_read(&self, id: &str) -> bool {
        self.lock().notifications.mark_as_read(id)
    }

    pub fn mark_all_as_read(&self) {
        self.lock().notifications.mark_all_as_read();
    }

    pub fn clear_notifications(&self) {
        self.lock().notifications.clear();
    }

    /// Newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.snapshot()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().notifications.unread_count()
    }

    pub fn last_triggered_at(&self) -> Option<DateTime<Utc>> {
        self.lock().last_triggered_at
    }
}

impl TickAction for LiveFeed {
    fn run_tick(&self) -> Result<()> {
        self.refresh();
        Ok(())
    }

    fn last_triggered_at(&self) -> Option<DateTime<Utc>> {
        LiveFeed::last_triggered_at(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::EventKind;
    use crate::pipeline::notifications::Severity;
    use crate::random::{ScriptedRandom, SeededRandom};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 29, 12, 0, 0).unwrap()
    }

    fn feed_with(rng: Box<dyn RandomSource>, probability: f64) -> LiveFeed {
        let config = DashboardConfig {
            notification_probability: probability,
            ..DashboardConfig::for_tests()
        };
        LiveFeed::new_with_timestamp_fn(&config, rng, Box::new(fixed_now))
    }

    #[test]
    fn test_refresh_publishes_one_event() {
        let feed = feed_with(Box::new(SeededRandom::from_seed(1)), 0.0);
        let mut rx = feed.subscribe_invalidation();

        let report = feed.refresh();

        assert_eq!(feed.events().len(), 1);
        assert_eq!(report.notification, None);
        assert_eq!(report.generation, 1);
        assert_eq!(feed.last_triggered_at(), Some(fixed_now()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn test_notification_shares_event_text() {
        let feed = feed_with(Box::new(ScriptedRandom::new(vec![0.0])), 1.0);

        let report = feed.refresh();
        let notification = report.notification.expect("probability 1.0 always notifies");

        assert_eq!(report.event.kind, EventKind::Sale);
        assert_eq!(notification.title, report.event.title);
        assert!(notification.message.starts_with(&report.event.description));
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(feed.unread_count(), 1);
    }

    #[test]
    fn test_notification_rate_roughly_matches_probability() {
        let feed = feed_with(Box::new(SeededRandom::from_seed(99)), 0.3);

        let notified = (0..1000).filter(|_| feed.refresh().notification.is_some()).count();

        // Notification store is capped at 50, so count from the reports
        assert!((200..400).contains(&notified), "notified {}", notified);
        assert_eq!(feed.events().len(), 100);
    }

    #[test]
    fn test_concurrent_refreshes_lose_nothing() {
        let feed = Arc::new(feed_with(Box::new(SeededRandom::from_seed(5)), 0.0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let feed = feed.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        feed.refresh();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(feed.generation(), 80);
        assert_eq!(feed.events().len(), 80);

        let mut ids: Vec<String> = feed.events().into_iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn test_explicit_milestone_event() {
        let feed = feed_with(Box::new(SeededRandom::from_seed(2)), 0.0);

        let event = feed.push_event(EventDraft {
            kind: EventKind::Milestone,
            title: "Milestone".to_string(),
            description: "Goal milestone reached".to_string(),
            value: Some(100_000.0),
        });

        assert_eq!(feed.recent_events(1), vec![event]);
        // Explicit pushes do not count as refreshes
        assert_eq!(feed.last_triggered_at(), None);
    }
}

//! # Realtime Pipeline
//!
//! Live side of the dashboard: a bounded event feed, a notification store,
//! and the auto-refresh scheduler that drives them.
//!
//! ## Flow
//!
//! ```text
//! RefreshScheduler (interval timer, one live loop)
//!     ↓ run_tick
//! LiveFeed::refresh
//!     ├─ bump invalidation generation (watch channel)
//!     ├─ stamp last_triggered_at
//!     ├─ synth::random_event → RealtimeEventBuffer (newest first, cap 100)
//!     └─ with probability p → NotificationStore (newest first, cap 50)
//! ```
//!
//! Manual refreshes call `LiveFeed::refresh` directly and share its lock
//! with scheduled ticks.

pub mod events;
pub mod feed;
pub mod notifications;
pub mod scheduler;
pub mod synth;

pub use events::{EventDraft, EventKind, RealtimeEvent, RealtimeEventBuffer};
pub use feed::{LiveFeed, RefreshReport, TickAction};
pub use notifications::{Notification, NotificationDraft, NotificationStore, Severity};
pub use scheduler::{RefreshConfig, RefreshScheduler, SchedulerState, SchedulerStats};

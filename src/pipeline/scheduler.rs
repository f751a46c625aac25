//! Auto-refresh scheduler
//!
//! Drives a [`TickAction`] on a fixed interval. At most one timer loop is
//! live at a time; every (re)arm bumps an epoch, and a loop whose epoch is
//! stale exits at its next wake-up without touching the action.
//!
//! The tick itself runs while holding the control lock, so `stop()` and
//! `set_interval()` wait out an in-flight tick and no tick can start after
//! either returns.

use super::feed::TickAction;
use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Snapshot of the refresh settings, as shown to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub last_triggered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks_completed: u64,
    pub ticks_failed: u64,
}

struct Control {
    enabled: bool,
    interval_secs: u64,
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
}

pub struct RefreshScheduler {
    action: Arc<dyn TickAction>,
    control: Arc<Mutex<Control>>,
    counters: Arc<Counters>,
}

fn lock_control(control: &Mutex<Control>) -> MutexGuard<'_, Control> {
    control.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RefreshScheduler {
    /// New scheduler in the `Stopped` state
    pub fn new(action: Arc<dyn TickAction>, interval_secs: u64) -> Result<Self> {
        if interval_secs == 0 {
            return Err(DashboardError::InvalidInterval(interval_secs));
        }

        Ok(Self {
            action,
            control: Arc::new(Mutex::new(Control {
                enabled: false,
                interval_secs,
                epoch: 0,
                handle: None,
            })),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Arm the timer; a no-op when already running
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut control = lock_control(&self.control);
        if control.enabled {
            return;
        }
        control.enabled = true;
        self.arm(&mut control);
    }

    /// Cancel the timer; idempotent
    ///
    /// Blocks until an in-flight tick finishes. Once this returns no further
    /// tick runs.
    pub fn stop(&self) {
        let mut control = lock_control(&self.control);
        if !control.enabled {
            return;
        }
        control.enabled = false;
        Self::disarm(&mut control);
        log::info!("⏹️  Auto-refresh stopped");
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Change the period; a running schedule is re-armed so the next tick is
    /// a full new interval away
    pub fn set_interval(&self, interval_secs: u64) -> Result<()> {
        if interval_secs == 0 {
            return Err(DashboardError::InvalidInterval(interval_secs));
        }

        let mut control = lock_control(&self.control);
        control.interval_secs = interval_secs;
        if control.enabled {
            self.arm(&mut control);
        }
        Ok(())
    }

    /// Run the action once, outside the schedule
    ///
    /// Serialised with scheduled ticks and does not move the next tick.
    pub fn trigger_now(&self) -> Result<()> {
        let _control = lock_control(&self.control);
        self.action.run_tick()
    }

    pub fn state(&self) -> SchedulerState {
        if lock_control(&self.control).enabled {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn config(&self) -> RefreshConfig {
        let control = lock_control(&self.control);
        RefreshConfig {
            enabled: control.enabled,
            interval_seconds: control.interval_secs,
            last_triggered_at: self.action.last_triggered_at(),
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ticks_completed: self.counters.completed.load(Ordering::Relaxed),
            ticks_failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn disarm(control: &mut Control) {
        control.epoch += 1;
        if let Some(handle) = control.handle.take() {
            handle.abort();
        }
    }

    /// Replace any live loop with a fresh one whose first tick is one full
    /// interval from now
    fn arm(&self, control: &mut Control) {
        Self::disarm(control);

        let epoch = control.epoch;
        let period = Duration::from_secs(control.interval_secs);
        let first_tick = Instant::now() + period;

        log::info!("⏰ Auto-refresh armed (interval: {}s)", control.interval_secs);

        control.handle = Some(tokio::spawn(refresh_loop(
            self.action.clone(),
            self.control.clone(),
            self.counters.clone(),
            epoch,
            first_tick,
            period,
        )));
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        Self::disarm(&mut lock_control(&self.control));
    }
}

async fn refresh_loop(
    action: Arc<dyn TickAction>,
    control: Arc<Mutex<Control>>,
    counters: Arc<Counters>,
    epoch: u64,
    first_tick: Instant,
    period: Duration,
) {
    let mut timer = interval_at(first_tick, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;

        let guard = lock_control(&control);
        if guard.epoch != epoch || !guard.enabled {
            log::debug!("Refresh loop epoch {} superseded, exiting", epoch);
            return;
        }

        // A failing tick is logged and the schedule carries on
        match panic::catch_unwind(AssertUnwindSafe(|| action.run_tick())) {
            Ok(Ok(())) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("❌ Refresh tick failed: {}", e);
            }
            Err(payload) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("❌ Refresh tick panicked: {}", panic_message(payload.as_ref()));
            }
        }
        drop(guard);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        runs: AtomicUsize,
    }

    impl TickAction for Counting {
        fn run_tick(&self) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Counting {
        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    async fn advance_secs(secs: u64) {
        // Step one second at a time so each due tick gets polled
        for _ in 0..secs {
            tokio::time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let action = Arc::new(Counting::default());
        assert!(matches!(
            RefreshScheduler::new(action, 0),
            Err(DashboardError::InvalidInterval(0))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_before_first_interval() {
        let action = Arc::new(Counting::default());
        let scheduler = RefreshScheduler::new(action.clone(), 30).unwrap();

        scheduler.start();
        advance_secs(29).await;
        assert_eq!(action.runs(), 0);

        advance_secs(1).await;
        assert_eq!(action.runs(), 1);

        advance_secs(60).await;
        assert_eq!(action.runs(), 3);
        assert_eq!(scheduler.stats().ticks_completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_one_loop() {
        let action = Arc::new(Counting::default());
        let scheduler = RefreshScheduler::new(action.clone(), 10).unwrap();

        scheduler.start();
        scheduler.start();
        advance_secs(10).await;

        assert_eq!(action.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let action = Arc::new(Counting::default());
        let scheduler = RefreshScheduler::new(action.clone(), 5).unwrap();

        scheduler.stop();
        scheduler.start();
        scheduler.stop();
        scheduler.stop();

        advance_secs(20).await;
        assert_eq!(action.runs(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_while_stopped_does_not_arm() {
        let action = Arc::new(Counting::default());
        let scheduler = RefreshScheduler::new(action.clone(), 30).unwrap();

        scheduler.set_interval(5).unwrap();
        advance_secs(20).await;

        assert_eq!(action.runs(), 0);
        assert_eq!(scheduler.config().interval_seconds, 5);
        assert!(!scheduler.config().enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_now_does_not_shift_schedule() {
        let action = Arc::new(Counting::default());
        let scheduler = RefreshScheduler::new(action.clone(), 10).unwrap();

        scheduler.start();
        advance_secs(4).await;
        scheduler.trigger_now().unwrap();
        assert_eq!(action.runs(), 1);

        advance_secs(6).await;
        assert_eq!(action.runs(), 2);
    }
}

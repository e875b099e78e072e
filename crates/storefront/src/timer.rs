//! Cancellable scheduled callbacks and the deal countdown.
//!
//! Every timer is owned by a [`ScheduledTask`]; dropping the handle aborts the
//! underlying tokio task, so a view that goes away cannot leave a recurring
//! callback behind.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to a spawned one-shot or recurring callback.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
#[must_use = "dropping a ScheduledTask cancels it"]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `fut` once after `delay`.
    pub fn after<F>(delay: Duration, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                fut.await;
            }),
        }
    }

    /// Run `callback` every `period`, first after one full period.
    ///
    /// Late ticks are delayed rather than bursted.
    pub fn every<F>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self {
            handle: tokio::spawn(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    callback();
                }
            }),
        }
    }

    /// Stop the task. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether a one-shot task has run to completion (or was aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Countdown
// =============================================================================

/// Time left on a deal, shown as hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    /// Tick period of the deal timer.
    pub const TICK: Duration = Duration::from_secs(1);

    #[must_use]
    pub const fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            remaining: hours
                .saturating_mul(3600)
                .saturating_add(minutes.saturating_mul(60))
                .saturating_add(seconds),
        }
    }

    #[must_use]
    pub const fn hours(&self) -> u64 {
        self.remaining / 3600
    }

    #[must_use]
    pub const fn minutes(&self) -> u64 {
        (self.remaining % 3600) / 60
    }

    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.remaining % 60
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Remove one second; stays at zero once finished.
    pub const fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Tick `countdown` once per second until the returned task is dropped.
    pub fn start(countdown: &Arc<Mutex<Self>>) -> ScheduledTask {
        let countdown = Arc::clone(countdown);
        ScheduledTask::every(Self::TICK, move || {
            countdown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick();
        })
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

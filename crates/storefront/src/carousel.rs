//! Slide position for rotating banners and strips.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::timer::ScheduledTask;

/// Index into a fixed number of slides with wrap-around navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    len: usize,
    current: usize,
    paused: bool,
}

impl Carousel {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            paused: false,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Change the slide count, e.g. once categories have loaded.
    ///
    /// The position resets when it falls outside the new range.
    pub const fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.current >= len {
            self.current = 0;
        }
    }

    pub const fn next(&mut self) {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
    }

    pub const fn prev(&mut self) {
        if self.len > 0 {
            self.current = if self.current == 0 {
                self.len - 1
            } else {
                self.current - 1
            };
        }
    }

    /// Jump to `index`. Out-of-range indexes are ignored.
    pub const fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Stop automatic advancing (hover, pause button).
    pub const fn pause(&mut self) {
        self.paused = true;
    }

    pub const fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip between paused and playing; returns whether it is now playing.
    pub const fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        !self.paused
    }

    /// One automatic step. Returns whether the position moved.
    pub const fn tick(&mut self) -> bool {
        if self.paused || self.len == 0 {
            return false;
        }
        self.next();
        true
    }
}

/// A carousel shared between its view and its auto-advance timer.
pub type SharedCarousel = Arc<Mutex<Carousel>>;

/// Advances a [`SharedCarousel`] on a fixed period while it is playing.
///
/// Stops when dropped.
#[derive(Debug)]
pub struct AutoAdvance {
    carousel: SharedCarousel,
    _task: ScheduledTask,
}

impl AutoAdvance {
    /// Period of the home page hero banner.
    pub const HERO_PERIOD: Duration = Duration::from_millis(6_000);
    /// Period of the category strip.
    pub const CATEGORY_PERIOD: Duration = Duration::from_millis(4_000);

    /// Start advancing `carousel` every `period`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(carousel: SharedCarousel, period: Duration) -> Self {
        let ticking = Arc::clone(&carousel);
        let task = ScheduledTask::every(period, move || {
            ticking.lock().unwrap_or_else(PoisonError::into_inner).tick();
        });
        Self {
            carousel,
            _task: task,
        }
    }

    #[must_use]
    pub const fn carousel(&self) -> &SharedCarousel {
        &self.carousel
    }

    /// Current slide index.
    #[must_use]
    pub fn current(&self) -> usize {
        self.carousel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }
}

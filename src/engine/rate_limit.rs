//! Time-windowed coalescing of expensive work. Callers pass `now` in, so
//! nothing here owns a timer.

use std::time::{Duration, Instant};

/// Leading-edge throttle with a single trailing call.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_fired: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            trailing: false,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn window_elapsed(&self, now: Instant) -> bool {
        self.last_fired
            .map_or(true, |last| now.saturating_duration_since(last) >= self.window)
    }

    /// Request a run. Returns `true` if the caller should run now; otherwise
    /// the request is folded into one trailing run.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.window_elapsed(now) {
            self.last_fired = Some(now);
            self.trailing = false;
            log::trace!("throttle fired on leading edge");
            true
        } else {
            self.trailing = true;
            false
        }
    }

    /// Returns `true` once when a trailing run is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.trailing && self.window_elapsed(now) {
            self.trailing = false;
            self.last_fired = Some(now);
            log::trace!("throttle fired on trailing edge");
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.trailing
    }

    /// Time left until a pending trailing run is due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if !self.trailing {
            return None;
        }
        let last = self.last_fired?;
        Some(self.window.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Drop a pending trailing run.
    pub fn cancel(&mut self) {
        self.trailing = false;
    }
}

/// Fires once `delay` has passed since the latest `schedule`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    due: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}

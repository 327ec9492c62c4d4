use std::time::{Duration, Instant};

/// A one-shot deadline that the owner rearms explicitly.
///
/// The event loop sleeps until [`Timer::deadline`], then calls
/// [`Timer::take_due`], which disarms the timer before the handler runs. The
/// handler rearms it when it is done, so a slow handler can never be entered
/// twice for the same period.
#[derive(Debug, Clone)]
pub struct Timer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, deadline: None }
    }

    /// Takes effect on the next [`Timer::start`].
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn start(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.interval);
        if self.deadline.is_none() {
            log::error!("Timer interval {:?} is out of range, timer left stopped", self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

//! Bounded retry with exponential backoff and an injectable delay

use std::cell::RefCell;
use std::time::Duration;
use vqa_core::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.retry.max_attempts, settings.base_delay())
    }

    /// Wait after the failed attempt with zero-based index `attempt`:
    /// `base * 2^attempt`, so 1s then 2s with the defaults. No jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// How the generator waits between attempts
pub trait Delay {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn sleep(&self, _duration: Duration) {}
}

/// Records requested waits without sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }

    pub fn total(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

impl<T: Delay + ?Sized> Delay for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

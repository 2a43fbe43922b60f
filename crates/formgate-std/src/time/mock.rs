#[cfg(any(test, feature = "test-support"))]
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(any(test, feature = "test-support"))]
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "test-support"))]
use super::GetNow;

/// Time only moves when you call [`advance`](MockClock::advance) or
/// [`set_unix`](MockClock::set_unix).
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the code under test owns another.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    since_epoch: Arc<Mutex<Duration>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MockClock {
    /// Starts at the Unix epoch.
    pub fn new() -> Self {
        Self::at_unix(0)
    }

    /// Starts at `secs` seconds after the Unix epoch.
    pub fn at_unix(secs: u64) -> Self {
        Self {
            since_epoch: Arc::new(Mutex::new(Duration::from_secs(secs))),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    /// Set the absolute time (vs. relative [`advance`](Self::advance)).
    pub fn set_unix(&self, secs: u64) {
        *self.lock() = Duration::from_secs(secs);
    }

    pub fn unix_secs(&self) -> u64 {
        self.lock().as_secs()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Duration> {
        self.since_epoch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl GetNow for MockClock {
    type Instant = SystemTime;

    fn now(&self) -> SystemTime {
        UNIX_EPOCH + *self.lock()
    }
}

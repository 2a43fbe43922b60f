use std::time::SystemTime;

use super::GetNow;

/// Reads the real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GetNow for SystemClock {
    type Instant = SystemTime;

    #[inline]
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

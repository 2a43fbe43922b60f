//! Zero-cost abstraction over the wall clock.
//!
//! Credential expiry is an absolute Unix timestamp, so the clock hands out
//! [`SystemTime`](std::time::SystemTime) values rather than monotonic
//! instants.
//!
//! # Examples
//!
//! ```
//! use formgate_std::time::{GetNow, SystemClock};
//! use std::time::{SystemTime, UNIX_EPOCH};
//!
//! fn unix_seconds<C: GetNow<Instant = SystemTime>>(clock: &C) -> u64 {
//!     clock
//!         .now()
//!         .duration_since(UNIX_EPOCH)
//!         .map(|d| d.as_secs())
//!         .unwrap_or(0)
//! }
//!
//! assert!(unix_seconds(&SystemClock) > 0);
//! ```
//!
//! ```ignore
//! use formgate_std::time::{GetNow, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::at_unix(1_700_000_000);
//! clock.advance(Duration::from_secs(30));
//! assert_eq!(unix_seconds(&clock), 1_700_000_030);
//! ```

mod get_now;
mod mock;
mod system;

pub use get_now::GetNow;
#[cfg(any(test, feature = "test-support"))]
pub use mock::MockClock;
pub use system::SystemClock;

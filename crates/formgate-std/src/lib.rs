//! Zero-cost abstractions over `std` for formgate.
//!
//! # Quick Start
//!
//! | Concern | Trait(s) | Production | Test |
//! |---------|----------|------------|------|
//! | Env vars | [`ReadEnv`] | [`SystemEnv`] | [`InMemoryEnv`]* |
//! | Wall clock | [`GetNow`] | [`SystemClock`] | [`MockClock`]* |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.
//!
//! # Thread Safety
//!
//! Production types ([`SystemEnv`], [`SystemClock`]) are zero-sized and
//! trivially `Send + Sync`.
//!
//! | Test type | Backing | `Send + Sync` |
//! |-----------|---------|---------------|
//! | [`InMemoryEnv`] | `RefCell<HashMap>` | No |
//! | [`MockClock`] | `Arc<Mutex<…>>` | Yes |
//!
//! [`MockClock`] is shared across tasks by the token manager tests, so it
//! must stay `Send + Sync`.

pub mod env;
pub mod time;

#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
pub use env::{ReadEnv, SystemEnv};
#[cfg(any(test, feature = "test-support"))]
pub use time::MockClock;
pub use time::{GetNow, SystemClock};

//! Zero-cost abstraction for environment variable access.
//!
//! # Examples
//!
//! ```
//! use formgate_std::env::{ReadEnv, SystemEnv};
//!
//! fn upstream_url<E: ReadEnv>(env: &E) -> String {
//!     env.var("FORMIO_API_URL")
//!         .unwrap_or_else(|_| "http://localhost:3001".to_string())
//! }
//!
//! let url = upstream_url(&SystemEnv);
//! ```
//!
//! ```ignore
//! use formgate_std::env::{ReadEnv, InMemoryEnv};
//!
//! let env = InMemoryEnv::new();
//! env.set("FORMIO_API_URL", "http://formio.test"); // takes &self, no `mut` needed
//!
//! assert_eq!(upstream_url(&env), "http://formio.test");
//! ```

mod in_memory;
mod read_env;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;
pub use read_env::ReadEnv;
pub use system::SystemEnv;

use std::env;

use super::ReadEnv;

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(any(test, feature = "test-support"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::env;

#[cfg(any(test, feature = "test-support"))]
use super::ReadEnv;

/// Environment double that never touches the process environment.
///
/// All methods take `&self`; values live in a `RefCell`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct InMemoryEnv {
    vars: RefCell<HashMap<String, String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.borrow_mut().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.borrow().contains_key(key)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .borrow()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}

use std::env;

/// Source of configuration values keyed by environment variable name.
///
/// Config loaders take `&impl ReadEnv` so tests can swap in
/// [`InMemoryEnv`](super::InMemoryEnv) instead of mutating the process
/// environment. No `Send + Sync` bound: configuration is read once at startup.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;

    /// Like [`var`](Self::var), but treats unset and blank values alike.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use formgate_std::env::ReadEnv;
use thiserror::Error;

use crate::codec::{AlphabetError, DEFAULT_ALPHABET, DEFAULT_MIN_LENGTH, IdCodec};
use crate::token::MachineLogin;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SALT: &str = "default_salt";
const DEFAULT_APPLICATION_ROOT: &str = "/forms/";

/// What to do when a single resource has no `tags` member and the follow-up
/// tag lookup does not succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagFallback {
    /// Return the original response.
    #[default]
    PassThrough,
    /// Fail with `PermissionDenied`.
    Deny,
}

impl FromStr for TagFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" | "allow" => Ok(Self::PassThrough),
            "deny" => Ok(Self::Deny),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the gateway and its HTTP surface.
///
/// Resolved from environment variables:
/// - `FORMIO_API_URL`: upstream base URL (required, trailing `/` trimmed)
/// - `FORMIO_API_KEY` / `FORMIO_API_SECRET`: machine-login credentials (required)
/// - `FORMIO_TIMEOUT_SECS`: per-request upstream timeout (default: 5)
/// - `HASHIDS_SALT`: identifier obfuscation salt (default: `default_salt`)
/// - `HASHIDS_ALPHABET`: obfuscation alphabet (default: lower-case letters and digits)
/// - `HASHIDS_MIN_LENGTH`: minimum external identifier length (default: 24)
/// - `FORMGATE_PORT`: HTTP listening port (default: 8080)
/// - `FORMGATE_APPLICATION_ROOT`: prefix for form links (default: `/forms/`)
/// - `FORMGATE_TAG_FALLBACK`: `pass-through` or `deny` (default: `pass-through`)
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_url: String,
    pub login: MachineLogin,
    pub timeout: Duration,
    pub hashids_salt: String,
    pub hashids_alphabet: String,
    pub hashids_min_length: usize,
    pub port: u16,
    pub application_root: String,
    pub tag_fallback: TagFallback,
}

impl GatewayConfig {
    pub fn new(api_url: impl Into<String>, login: MachineLogin) -> Self {
        Self {
            api_url: trim_base(api_url.into()),
            login,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            hashids_salt: DEFAULT_SALT.to_string(),
            hashids_alphabet: DEFAULT_ALPHABET.to_string(),
            hashids_min_length: DEFAULT_MIN_LENGTH,
            port: DEFAULT_PORT,
            application_root: DEFAULT_APPLICATION_ROOT.to_string(),
            tag_fallback: TagFallback::default(),
        }
    }

    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let required = |var: &'static str| env.non_empty(var).ok_or(ConfigError::Missing(var));

        let login = MachineLogin::new(required("FORMIO_API_KEY")?, required("FORMIO_API_SECRET")?);
        let mut config = Self::new(required("FORMIO_API_URL")?, login);

        if let Some(secs) = env
            .var("FORMIO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(salt) = env.var("HASHIDS_SALT") {
            config.hashids_salt = salt;
        }
        if let Ok(alphabet) = env.var("HASHIDS_ALPHABET") {
            config.hashids_alphabet = alphabet;
        }
        config.hashids_min_length = env
            .var("HASHIDS_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_LENGTH);
        config.port = env
            .var("FORMGATE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        if let Ok(root) = env.var("FORMGATE_APPLICATION_ROOT") {
            config.application_root = root;
        }
        if let Ok(raw) = env.var("FORMGATE_TAG_FALLBACK") {
            config.tag_fallback = raw.parse().map_err(|value| ConfigError::Invalid {
                var: "FORMGATE_TAG_FALLBACK",
                value,
            })?;
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_hashids(
        mut self,
        salt: impl Into<String>,
        alphabet: impl Into<String>,
        min_length: usize,
    ) -> Self {
        self.hashids_salt = salt.into();
        self.hashids_alphabet = alphabet.into();
        self.hashids_min_length = min_length;
        self
    }

    pub fn with_application_root(mut self, root: impl Into<String>) -> Self {
        self.application_root = root.into();
        self
    }

    pub fn with_tag_fallback(mut self, fallback: TagFallback) -> Self {
        self.tag_fallback = fallback;
        self
    }

    /// Build the identifier codec from the configured salt and alphabet.
    pub fn id_codec(&self) -> Result<IdCodec, AlphabetError> {
        IdCodec::new(
            &self.hashids_salt,
            &self.hashids_alphabet,
            self.hashids_min_length,
        )
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_url", &self.api_url)
            .field("login", &self.login)
            .field("timeout", &self.timeout)
            .field("hashids_salt", &"[REDACTED]")
            .field("hashids_alphabet", &self.hashids_alphabet)
            .field("hashids_min_length", &self.hashids_min_length)
            .field("port", &self.port)
            .field("application_root", &self.application_root)
            .field("tag_fallback", &self.tag_fallback)
            .finish()
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

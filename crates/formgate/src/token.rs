//! Machine-login credential cache for the upstream form service.
//!
//! The upstream issues a JWT through `POST {base}/machine/login`, returned in
//! the `X-Jwt-Token` response header. Only the `exp` claim is read; the
//! signature is never checked because the upstream re-validates the token on
//! every call.
//!
//! A cached credential is reused while more than [`EXPIRY_MARGIN_SECS`]
//! seconds remain before `exp`. Refreshes are single-flight: concurrent callers
//! wait on one login and then all observe its result.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use formgate_std::{GetNow, SystemClock};
use jsonwebtoken::{DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Response header carrying the issued credential.
pub const TOKEN_HEADER: &str = "X-Jwt-Token";

/// A credential closer than this to its expiry is refreshed.
pub const EXPIRY_MARGIN_SECS: u64 = 30;

// ── Credential ────────────────────────────────────────────────────────────────

/// Immutable bearer token plus its claimed expiry. Replaced, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    expires_at: u64,
}

impl Credential {
    pub fn new(value: impl Into<String>, expires_at: u64) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Claimed expiry, seconds since the Unix epoch.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// `true` while more than the safety margin remains at `now_secs`.
    pub fn is_fresh_at(&self, now_secs: u64) -> bool {
        now_secs.saturating_add(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("login request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("login rejected with status {0}")]
    Status(u16),

    #[error("login response carries no X-Jwt-Token header")]
    MissingHeader,

    #[error("credential claims could not be read: {0}")]
    Claims(#[from] jsonwebtoken::errors::Error),

    #[error("credential expires at {expires_at}, too close to now ({now})")]
    ExpiresTooSoon { expires_at: u64, now: u64 },
}

// ── Machine login ─────────────────────────────────────────────────────────────

/// Key and secret for the machine-login exchange.
#[derive(Clone)]
pub struct MachineLogin {
    pub api_key: String,
    pub api_secret: String,
}

impl MachineLogin {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl std::fmt::Debug for MachineLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineLogin")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: u64,
}

/// Read `exp` from a JWT without checking its signature.
pub fn read_expiry(token: &str) -> Result<u64, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    let data = jsonwebtoken::decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp)
}

// ── Manager ───────────────────────────────────────────────────────────────────

/// Shared credential cache. One instance serves every concurrent request.
pub struct TokenManager<C = SystemClock> {
    http: Client,
    login_url: String,
    login: MachineLogin,
    timeout: Duration,
    clock: C,
    current: ArcSwapOption<Credential>,
    refresh: Mutex<()>,
}

impl TokenManager<SystemClock> {
    pub fn new(http: Client, base_url: &str, login: MachineLogin, timeout: Duration) -> Self {
        Self::with_clock(http, base_url, login, timeout, SystemClock)
    }
}

impl<C> TokenManager<C>
where
    C: GetNow<Instant = SystemTime>,
{
    pub fn with_clock(
        http: Client,
        base_url: &str,
        login: MachineLogin,
        timeout: Duration,
        clock: C,
    ) -> Self {
        Self {
            http,
            login_url: format!("{}/machine/login", base_url.trim_end_matches('/')),
            login,
            timeout,
            clock,
            current: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
        }
    }

    /// A credential with more than the safety margin left, logging in if the
    /// cache cannot provide one. Failures are not cached.
    pub async fn get_token(&self) -> Result<Arc<Credential>, TokenError> {
        if let Some(cached) = self.fresh_cached() {
            return Ok(cached);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(cached) = self.fresh_cached() {
            debug!("credential refreshed by a concurrent caller");
            return Ok(cached);
        }

        let credential = Arc::new(self.machine_login().await?);
        self.current.store(Some(Arc::clone(&credential)));
        debug!(expires_at = credential.expires_at, "credential refreshed");
        Ok(credential)
    }

    /// Drop the cached credential so the next call logs in again.
    pub fn invalidate(&self) {
        self.current.store(None);
    }

    fn now_secs(&self) -> u64 {
        self.clock
            .now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    fn fresh_cached(&self) -> Option<Arc<Credential>> {
        let now = self.now_secs();
        self.current
            .load_full()
            .filter(|credential| credential.is_fresh_at(now))
    }

    async fn machine_login(&self) -> Result<Credential, TokenError> {
        let body = json!({
            "data": {
                "api_key": self.login.api_key,
                "api_secret": self.login.api_secret,
            }
        });

        let resp = self
            .http
            .post(&self.login_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.login_url, "machine login request failed");
                TokenError::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url = %self.login_url, "machine login rejected");
            return Err(TokenError::Status(status.as_u16()));
        }

        let value = resp
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                error!(url = %self.login_url, "machine login response has no token header");
                TokenError::MissingHeader
            })?;

        let expires_at = read_expiry(&value).map_err(|e| {
            error!(error = %e, "could not read credential expiry");
            TokenError::Claims(e)
        })?;

        let credential = Credential::new(value, expires_at);
        let now = self.now_secs();
        if !credential.is_fresh_at(now) {
            error!(expires_at, now, "issued credential is already inside the expiry margin");
            return Err(TokenError::ExpiresTooSoon { expires_at, now });
        }
        Ok(credential)
    }
}

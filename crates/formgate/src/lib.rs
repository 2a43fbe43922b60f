//! # formgate
//!
//! Permission-aware gateway in front of a Form.io-style form service.
//!
//! ## How it works
//!
//! 1. A shared [`TokenManager`] logs in with the machine key/secret
//!    (`POST {base}/machine/login`) and caches the `X-Jwt-Token` credential
//!    until 30 seconds before its `exp` claim.
//! 2. [`GatewayClient`] forwards each request with that credential, classifies
//!    the response, and applies `perm:` tag rules for the calling
//!    [`Principal`].
//! 3. [`FormsService`] builds the form catalogue and submission views on top,
//!    hiding submission ids behind the [`IdCodec`].
//! 4. [`server`] exposes those operations as JSON over axum.
//!
//! ## Access rules
//!
//! - A resource tagged `perm:<action>` needs a caller permission ending in
//!   `.<action>`; any one of several `perm:` tags is enough.
//! - A single resource without `perm:` tags is public. When its body has no
//!   `tags` member, the tags are fetched with `?select=tags`.
//! - In a list, elements without tags are dropped.
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `FORMIO_API_URL` | (required) | Upstream base URL |
//! | `FORMIO_API_KEY` | (required) | Machine-login key |
//! | `FORMIO_API_SECRET` | (required) | Machine-login secret |
//! | `FORMIO_TIMEOUT_SECS` | `5` | Upstream request timeout |
//! | `HASHIDS_SALT` | `default_salt` | Identifier obfuscation salt |
//! | `HASHIDS_ALPHABET` | `a-z0-9` | Obfuscation alphabet |
//! | `HASHIDS_MIN_LENGTH` | `24` | Minimum external id length |
//! | `FORMGATE_PORT` | `8080` | HTTP listening port |
//! | `FORMGATE_APPLICATION_ROOT` | `/forms/` | Prefix for form links |
//! | `FORMGATE_TAG_FALLBACK` | `pass-through` | `pass-through` or `deny` when a tag lookup fails |

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod forms;
pub mod permissions;
pub mod server;
pub mod tags;
pub mod token;

pub use client::GatewayClient;
pub use codec::{AlphabetError, IdCodec};
pub use config::{ConfigError, GatewayConfig, TagFallback};
pub use error::{GatewayError, InvalidIdentifier, Result};
pub use forms::{FormSummary, FormsService, SubmissionSummary};
pub use permissions::Principal;
pub use server::{router, serve};
pub use tags::TagSet;
pub use token::{Credential, MachineLogin, TokenError, TokenManager};

//! Error taxonomy for gateway operations.

use serde_json::Value;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// An internal or external identifier that does not describe a 24-character
/// hexadecimal record id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or corrupt identifier: {0}")]
pub struct InvalidIdentifier(pub String);

/// Terminal failures of a single gateway request.
///
/// None of these are process-fatal; callers translate them into whatever
/// response format they serve (see [`GatewayError::status_code`]).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("authentication with the form service failed")]
    AuthenticationFailure,

    #[error("upstream service error: {0}")]
    GatewayUnavailable(String),

    /// `status` is already remapped (401 becomes 403) and `body` carries the
    /// sanitized error payload.
    #[error("upstream returned status {status}")]
    UpstreamApplication { status: u16, body: Value },

    #[error("You do not have permission to do that!")]
    PermissionDenied,

    #[error("Invalid response from server: {0}")]
    MalformedUpstreamResponse(String),
}

impl GatewayError {
    /// HTTP status the caller should surface for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidIdentifier(_) => 400,
            Self::AuthenticationFailure => 401,
            Self::GatewayUnavailable(_) => 502,
            Self::UpstreamApplication { status, .. } => *status,
            Self::PermissionDenied => 403,
            Self::MalformedUpstreamResponse(_) => 500,
        }
    }
}

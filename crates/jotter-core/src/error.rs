//! Error types for remote API calls

use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Failures surfaced by the remote API gateway.
///
/// Messages carried by the 4xx variants come verbatim from the `message`
/// field of the response body and are meant for display.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure, no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// 401 / unauthenticated response
    #[error("{0}")]
    Auth(String),

    /// Request rejected by the remote (4xx other than 401/404), or by
    /// client-side validation before any request was sent
    #[error("{0}")]
    Validation(String),

    /// The remote no longer has the requested resource
    #[error("{0}")]
    NotFound(String),

    /// Any other non-2xx response
    #[error("{message}")]
    Unknown { status: u16, message: String },

    /// A 2xx response whose body could not be decoded
    #[error("Unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid API configuration: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Whether this error means the session is missing or expired.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Map a non-2xx status and its display message onto the error taxonomy.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Auth(message),
            404 => Self::NotFound(message),
            400..=499 => Self::Validation(message),
            _ => Self::Unknown { status, message },
        }
    }
}

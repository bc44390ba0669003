// crates/client/src/error.rs
use thiserror::Error;

/// Errors surfaced by the transport client and the job service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced an HTTP status (connect failure, timeout, reset).
    #[error("Network error: {0}")]
    Transport(String),

    /// The session is no longer valid; the user has to log in again.
    #[error("Unauthorized request to {path}")]
    Unauthorized { path: String },

    /// The server requires multi-factor authentication before serving requests.
    #[error("Multi-factor authentication required")]
    MfaRequired,

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        id: Option<String>,
        message: String,
    },

    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The status controller was unmounted.
    #[error("Status controller is unmounted")]
    Disposed,
}

impl ClientError {
    /// HTTP status attached to the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Errors raised while validating [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server URL '{url}': {message}")]
    InvalidServerUrl { url: String, message: String },

    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Poll interval must be at least one second")]
    ZeroPollInterval,

    #[error("Request timeout must be at least one second")]
    ZeroRequestTimeout,

    #[error("Page size must be between 1 and 200, got {0}")]
    InvalidPageSize(u32),

    #[error("Job type must not be empty")]
    EmptyJobType,
}

use std::io;

use jotter_core::config::ConfigError;
use jotter_core::store::StoreError;
use jotter_core::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    ClientConfig(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Invalid note ID: {0}")]
    InvalidNoteId(String),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Could not reach the notes server to check the session")]
    ServerUnreachable,
    #[error("Session expired")]
    SessionExpired,
}

impl CliError {
    /// Errors that a fresh `jotter login` would resolve.
    pub const fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn | Self::SessionExpired | Self::Gateway(GatewayError::Auth(_))
        ) || matches!(self, Self::Store(error) if error.is_session_expired())
    }
}

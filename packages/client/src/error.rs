//! Error types for the terminal client.

use thiserror::Error;

/// Errors that end a client session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the handshake; retrying cannot help.
    #[error("Server rejected the connection with HTTP {0}")]
    Rejected(u16),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl ClientError {
    /// Whether the runner should give up instead of reconnecting.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Rejected(401 | 404))
    }
}

/// A command line that could not be turned into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the command list")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

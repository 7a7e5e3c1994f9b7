//! Client error types.

use thiserror::Error;
use tinykv_protocol::ProtocolError;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Validation or decoding failure from the codec.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The socket could not be established.
    #[error("connection error: {0}")]
    Connection(#[source] std::io::Error),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not connected")]
    NotConnected,

    #[error("session closed")]
    SessionClosed,

    /// The peer closed the socket while a response was outstanding.
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("response timeout")]
    ResponseTimeout,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Returns whether this error was raised by local validation, before
    /// anything was written to the socket.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Protocol(e) if e.is_validation())
    }

    /// Returns whether retrying on a fresh session may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_)
                | ClientError::ConnectTimeout
                | ClientError::Io(_)
                | ClientError::ConnectionClosed
                | ClientError::ResponseTimeout
        )
    }
}

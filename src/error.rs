//! Error types for kvline
//!
//! Provides a unified error type for all client operations.
//!
//! Every failure is returned to the immediate caller. The client performs no
//! retries and no automatic reconnection.

use std::io;

use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Unified error type for kvline operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // Memory Errors
    // -------------------------------------------------------------------------
    /// Growing the receive buffer or the multibulk store failed.
    #[error("out of memory while growing by {requested} units")]
    OutOfMemory { requested: usize },

    // -------------------------------------------------------------------------
    // Connection Setup Errors
    // -------------------------------------------------------------------------
    #[error("could not resolve address: {0}")]
    Resolve(String),

    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    /// The server answered the handshake without a usable version field.
    #[error("handshake failed: {0}")]
    Handshake(String),

    // -------------------------------------------------------------------------
    // Transfer Errors
    // -------------------------------------------------------------------------
    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("operation timed out")]
    Timeout,

    #[error("receive failed: {0}")]
    Receive(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Reply Errors
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Well-formed `-` reply: the request failed on the server side.
    #[error("server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Connection State Errors
    // -------------------------------------------------------------------------
    #[error("connection is broken by an earlier failure; reconnect before retrying")]
    Broken,
}

impl ClientError {
    /// Peer closed the stream while a reply was expected.
    pub(crate) fn closed() -> Self {
        ClientError::Receive(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by server",
        ))
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        ClientError::Protocol(message.into())
    }

    /// Returns true for a send/receive that did not finish within the bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout)
    }

    /// Returns true when the server itself rejected the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::Server(_))
    }

    /// Returns true when the stream state is indeterminate after this error
    /// and the connection must not be reused.
    pub fn invalidates_connection(&self) -> bool {
        !matches!(self, ClientError::Server(_))
    }
}

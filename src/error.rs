//! Error types for openvpn-mi
//!
//! Two families of failures exist: the transport failed to carry a complete
//! exchange, or the text that arrived could not be decoded into the expected
//! value. `MiError` unifies both for callers driving a whole exchange.

use thiserror::Error;

/// Result type alias using MiError
pub type Result<T> = std::result::Result<T, MiError>;

/// Result of a stream-level operation (send or read)
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Result of a pure decode
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failures of the byte stream underneath the protocol
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// End of input was reached before a response was fully framed
    #[error("incomplete response: stream ended after {partial_lines} line(s)")]
    Incomplete { partial_lines: usize },

    #[error("read failed: {0}")]
    ReadFailed(#[source] std::io::Error),
}

/// Failures turning raw response text into a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty response")]
    Empty,

    #[error("unexpected response shape: {0}")]
    WrongShape(String),

    #[error("malformed field: {0}")]
    Malformed(String),

    /// The daemon answered with its own error marker; message kept verbatim
    #[error("daemon reported error: {0}")]
    DaemonReportedError(String),
}

/// Unified error type for openvpn-mi operations
#[derive(Debug, Error)]
pub enum MiError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Raised while setting up a stream, never during an exchange
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, MiError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, MiError::Decode(_))
    }
}

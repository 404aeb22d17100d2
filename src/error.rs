//! Error types
//!
//! Only [`Error::Bind`] is fatal to the server. Everything else is scoped to a
//! single connection or a single tick.

use std::net::SocketAddr;
use std::time::Duration;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Transport I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The report generator could not produce a value
    #[error("generator error: {0}")]
    Generate(#[from] GenerateError),

    /// A write did not complete before its deadline
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// The subscriber handle has already been removed
    #[error("subscriber closed")]
    Closed,

    /// Text that does not match the report layout
    #[error("invalid report: {0}")]
    InvalidReport(String),
}

/// Wire framing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Payload does not fit a 16-bit length prefix
    #[error("payload of {0} bytes exceeds the 65535 byte frame limit")]
    TooLarge(usize),

    /// Payload is not valid UTF-8
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Stream ended in the middle of a frame
    #[error("stream ended mid-frame ({received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },
}

/// Report generation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("no cities configured")]
    EmptyCities,

    #[error("no conditions configured")]
    EmptyConditions,

    #[error("empty {0} range")]
    EmptyRange(&'static str),
}

impl Error {
    /// Whether the error means the peer went away
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            Error::Frame(FrameError::Truncated { .. }) | Error::Closed => true,
            _ => false,
        }
    }
}

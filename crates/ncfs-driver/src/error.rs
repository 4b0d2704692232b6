//! Driver error types.

use ncfs_types::CodecError;
use thiserror::Error;

/// Failure moving one request over the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or protocol failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request context was cancelled while the call was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The remote answered with a non-2xx status.
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Driver error type.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Arguments could not be encoded.
    #[error("{operation}: {source}")]
    Encode {
        operation: &'static str,
        #[source]
        source: CodecError,
    },

    /// The reply body did not decode into the operation's result.
    #[error("{operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: CodecError,
    },

    /// The remote API has no endpoint for this operation.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    /// A reference with neither resource id nor path.
    #[error("invalid reference for {0}: needs a resource id or a path")]
    InvalidReference(&'static str),
}

impl DriverError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status of a rejected call, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

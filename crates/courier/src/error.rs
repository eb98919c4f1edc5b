//! Error types for courier.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::data::ContentEncoding;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("bad URL protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("invalid value for transport option '{name}': {value}")]
    InvalidOption { name: String, value: String },

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("server aborted request")]
    AbortedByPeer,

    #[error(
        "received a response which was longer than acceptable when buffering ({received} bytes, limit {limit})"
    )]
    BufferLimitExceeded { limit: usize, received: usize },

    #[error("timeout reached after {0:?}")]
    TimeoutExceeded(Duration),

    #[error("failed to decompress {encoding} response body: {source}")]
    Decompression {
        encoding: ContentEncoding,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Wrap a transport-level failure, keeping its message and source chain.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }

    /// Returns `true` for failures raised by the executor's own guards
    /// (limit, deadline) rather than by the transport.
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            Self::BufferLimitExceeded { .. } | Self::TimeoutExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_is_transparent() {
        let err = Error::transport(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(err.to_string(), "refused");
        assert!(!err.is_guard());
    }

    #[test]
    fn limit_error_reports_sizes() {
        let err = Error::BufferLimitExceeded { limit: 10, received: 11 };
        assert!(err.to_string().contains("11 bytes"));
        assert!(err.is_guard());
    }
}

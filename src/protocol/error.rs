//! Error taxonomy for HTTP/1.x framing.
//!
//! Every error is fatal for the connection it occurred on: the message
//! stream terminates with the error value and no further message is
//! delivered. [`ParseError::UnsupportedProtocol`] additionally carries a
//! flag telling a collaborator whether the peer spoke some other HTTP
//! version (and a fallback handler might apply) or plain garbage.

use std::io;
use thiserror::Error;

/// Errors raised while framing HTTP/1.x messages
#[derive(Error, Debug)]
pub enum ParseError {
    /// The start line named a protocol other than HTTP/1.0 or HTTP/1.1
    #[error("unsupported protocol: {protocol}")]
    UnsupportedProtocol {
        /// The protocol token as it appeared on the wire
        protocol: String,
        /// True when the token still matches `HTTP/<digits>.<digits>`,
        /// e.g. the HTTP/2 connection preface
        looks_http_ish: bool,
    },

    /// Malformed request framing
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// Malformed response framing
    #[error("bad response: {reason}")]
    BadResponse { reason: String },

    /// A recognized feature this parser does not implement
    #[error("server error: {reason}")]
    ServerError { reason: String },

    /// I/O error on the underlying transport
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    /// Creates a new UnsupportedProtocol error
    pub fn unsupported_protocol<S: ToString>(protocol: S, looks_http_ish: bool) -> Self {
        Self::UnsupportedProtocol { protocol: protocol.to_string(), looks_http_ish }
    }

    /// Creates a new BadRequest error
    pub fn bad_request<S: ToString>(reason: S) -> Self {
        Self::BadRequest { reason: reason.to_string() }
    }

    /// Creates a new BadResponse error
    pub fn bad_response<S: ToString>(reason: S) -> Self {
        Self::BadResponse { reason: reason.to_string() }
    }

    /// Creates a new ServerError error
    pub fn server_error<S: ToString>(reason: S) -> Self {
        Self::ServerError { reason: reason.to_string() }
    }

    /// Creates a new I/O error
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns the `looks_http_ish` flag for protocol errors
    pub fn looks_http_ish(&self) -> Option<bool> {
        match self {
            Self::UnsupportedProtocol { looks_http_ish, .. } => Some(*looks_http_ish),
            _ => None,
        }
    }

    /// Derives the abort signal delivered to an in-flight body stream when
    /// the connection fails with this error
    pub(crate) fn aborted(&self) -> Self {
        Self::io(io::Error::new(io::ErrorKind::ConnectionAborted, self.to_string()))
    }
}

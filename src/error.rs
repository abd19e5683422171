//! Error types for the Deform key-value client

use thiserror::Error;

/// Errors that can occur when talking to a Deform collection
///
/// Every variant produced by [`Client::get`](crate::Client::get) or
/// [`Client::set`](crate::Client::set) carries the key that was being
/// operated on. Only construction errors have no key.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never got a response (DNS, connect, TLS handshake, reset)
    #[error("Transport error: {message} (key '{key}')")]
    Transport {
        /// Key being operated on
        key: String,
        /// Underlying cause
        message: String,
    },

    /// The response arrived but its body could not be read
    #[error("Failed to read response body: {message} (key '{key}')")]
    ReadBody {
        /// Key being operated on
        key: String,
        /// Underlying cause
        message: String,
    },

    /// The service answered with a status other than 200 or 201
    #[error("Remote error (status {status}): {message} (key '{key}')")]
    Remote {
        /// Key being operated on
        key: String,
        /// HTTP status code
        status: u16,
        /// Raw response body, as sent by the service
        message: String,
    },

    /// The response body was not a valid document
    #[error("Failed to decode document: {source} (key '{key}')")]
    Decode {
        /// Key being operated on
        key: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be serialized
    #[error("Failed to encode document: {source} (key '{key}')")]
    Encode {
        /// Key being operated on
        key: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The configured request timeout elapsed
    #[error("Request timeout after {timeout_ms}ms (key '{key}')")]
    Timeout {
        /// Key being operated on
        key: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The request could not be built (e.g. the token is not a valid header value)
    #[error("Invalid request: {message} (key '{key}')")]
    InvalidRequest {
        /// Key being operated on
        key: String,
        /// Builder error
        message: String,
    },

    /// The configured project, host or API base does not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS setup failed
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// The key that was being operated on, if the error came from a call
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::Transport { key, .. }
            | Error::ReadBody { key, .. }
            | Error::Remote { key, .. }
            | Error::Decode { key, .. }
            | Error::Encode { key, .. }
            | Error::Timeout { key, .. }
            | Error::InvalidRequest { key, .. } => Some(key),
            Error::InvalidUrl(_) | Error::Tls(_) => None,
        }
    }

    /// HTTP status returned by the service, for [`Error::Remote`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service reported the document as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

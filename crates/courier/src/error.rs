//! Error types for the networking module.
//!
//! Every failure a dispatch can end in is a variant of [`NetworkError`]. The
//! error is delivered through the completion handler exactly like a success
//! value; nothing is thrown across the task boundary and nothing is retried.

use std::convert::Infallible;

use bytes::Bytes;
use thiserror::Error;

use crate::http::ErrorBody;

/// A request descriptor could not be turned into a wire request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The composed URL components do not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A parameter value could not be encoded.
    #[error("Parameter encoding failed: {0}")]
    EncodingFailed(String),
    /// A caller header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl From<url::ParseError> for BuildError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for BuildError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for BuildError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Result type for request construction.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// The transport failed before producing a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out")]
    Timeout,
    /// Connection refused, reset or otherwise failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// Any other transport-level failure.
    #[error("HTTP request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// A response body could not be decoded into the expected model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    /// Create a decode error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// The terminal failure of a dispatch.
///
/// `E` is the caller's error model; it defaults to [`Infallible`] for
/// dispatches without an error decoder, in which case server errors always
/// carry the raw body.
#[derive(Debug, Error)]
pub enum NetworkError<E = Infallible> {
    /// The descriptor could not be built; the transport was never invoked.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] BuildError),
    /// The transport itself failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    /// No structured HTTP response was obtained.
    #[error("Invalid response: no HTTP response head")]
    InvalidResponse,
    /// The server answered with a status above 299.
    #[error("HTTP {status}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The decoded error model, or the raw body.
        body: ErrorBody<E>,
    },
    /// Success status, but the body did not decode into the model.
    #[error("Unable to decode response (HTTP {status}): {source}")]
    Decode {
        /// The HTTP status code.
        status: u16,
        /// The undecodable body.
        body: Bytes,
        /// Why decoding failed.
        source: DecodeError,
    },
}

impl<E> NetworkError<E> {
    /// The HTTP status code, when a response head was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request failed before dispatch.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

/// Result type for dispatch outcomes.
pub type Result<T, E = Infallible> = std::result::Result<T, NetworkError<E>>;

/// Failures while constructing a service or transport.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No tokio runtime handle was supplied or available on this thread.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Error returned by an interceptor's observe step. Logged, never surfaced.
pub type ObserveError = Box<dyn std::error::Error + Send + Sync>;

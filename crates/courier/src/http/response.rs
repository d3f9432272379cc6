//! HTTP response types and outcome classification.

use std::convert::Infallible;

use bytes::Bytes;

use super::decode::Decoders;
use crate::error::{NetworkError, TransportError};
use crate::logging::targets;

/// Highest status code treated as success.
pub const MAX_SUCCESS_STATUS: u16 = 299;

/// Status line and headers of a received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseHead {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: http::HeaderMap,
}

impl ResponseHead {
    /// A head with the given status and no headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: http::HeaderMap::new(),
        }
    }

    /// Check if the status is in the success range (at most 299).
    pub fn is_success(&self) -> bool {
        self.status <= MAX_SUCCESS_STATUS
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }
}

/// What a transport hands back for one request.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// The structured response head, if one was obtained.
    pub head: Option<ResponseHead>,
    /// The raw body bytes.
    pub body: Bytes,
}

impl TransportResponse {
    /// A response with a head and a body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            head: Some(ResponseHead::new(status)),
            body: body.into(),
        }
    }

    /// Bytes that arrived without any structured response head.
    pub fn headless(body: impl Into<Bytes>) -> Self {
        Self {
            head: None,
            body: body.into(),
        }
    }
}

/// A successfully classified response.
#[derive(Clone, Debug)]
pub struct Response<T> {
    /// The HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// The decoded body; `None` exactly when the body was empty.
    pub value: Option<T>,
}

/// The body carried by a server error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorBody<E> {
    /// The body decoded into the caller's error model.
    Decoded(E),
    /// The raw body, when no error decoder was supplied or it failed.
    Raw(Bytes),
}

impl<E> ErrorBody<E> {
    /// The decoded error model, if any.
    pub fn decoded(&self) -> Option<&E> {
        match self {
            Self::Decoded(e) => Some(e),
            Self::Raw(_) => None,
        }
    }

    /// The raw body, if the error was not decoded.
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Self::Decoded(_) => None,
            Self::Raw(bytes) => Some(bytes),
        }
    }
}

/// The single terminal value delivered for a dispatch.
pub type DispatchResult<M, E = Infallible> = Result<Response<M>, NetworkError<E>>;

/// Classify a transport outcome and decode it.
///
/// - transport failure → [`NetworkError::Transport`]
/// - no response head → [`NetworkError::InvalidResponse`]
/// - status above 299 → [`NetworkError::Server`], decoded with the error
///   decoder when one is supplied and succeeds
/// - empty body → success with `value: None`
/// - undecodable body → [`NetworkError::Decode`]
pub fn classify<M, E>(
    outcome: Result<TransportResponse, TransportError>,
    decoders: &Decoders<M, E>,
) -> DispatchResult<M, E> {
    let TransportResponse { head, body } = outcome?;
    let Some(ResponseHead { status, headers }) = head else {
        return Err(NetworkError::InvalidResponse);
    };

    if status > MAX_SUCCESS_STATUS {
        let body = match decoders.decode_error(&body) {
            Some(Ok(error)) => ErrorBody::Decoded(error),
            Some(Err(e)) => {
                tracing::debug!(
                    target: targets::HTTP,
                    "Error body for HTTP {} did not decode: {}",
                    status,
                    e
                );
                ErrorBody::Raw(body)
            }
            None => ErrorBody::Raw(body),
        };
        return Err(NetworkError::Server { status, body });
    }

    if body.is_empty() {
        return Ok(Response {
            status_code: status,
            headers,
            value: None,
        });
    }

    match decoders.decode_model(&body) {
        Ok(value) => Ok(Response {
            status_code: status,
            headers,
            value: Some(value),
        }),
        Err(source) => Err(NetworkError::Decode {
            status,
            body,
            source,
        }),
    }
}

//! courier: an HTTP client built around request descriptors.
//!
//! Callers describe a logical request as a value, and a [`NetworkService`]
//! turns it into a wire request, sends it over an injectable [`Transport`],
//! classifies the outcome and decodes the body into a caller-chosen model.
//! Each dispatch is tracked under a [`TaskId`] that can cancel it.
//!
//! # Dispatching
//!
//! ```ignore
//! use courier::{NetworkService, ParameterEncoding, RequestDescriptor};
//!
//! let service = NetworkService::with_defaults()?;
//!
//! let descriptor = RequestDescriptor::get("https://api.example.com", "/users")
//!     .parameter("id", "42")
//!     .encoding(ParameterEncoding::UrlForm)
//!     .build();
//!
//! service.dispatch::<User, _>(&descriptor, |result| match result {
//!     Ok(response) => println!("HTTP {}: {:?}", response.status_code, response.value),
//!     Err(e) => eprintln!("Request failed: {e}"),
//! });
//! ```
//!
//! # Error models
//!
//! Server errors (status above 299) can be decoded into a typed error model:
//!
//! ```ignore
//! use courier::{Decoders, ErrorBody, NetworkError};
//!
//! let decoders = Decoders::<User>::json().with_json_errors::<ApiError>();
//! match service.submit_with(&descriptor, decoders).wait().await {
//!     Some(Err(NetworkError::Server { body: ErrorBody::Decoded(e), .. })) => { /* ... */ }
//!     _ => {}
//! }
//! ```
//!
//! # Testing
//!
//! Anything implementing [`Transport`] can stand in for the network, which
//! makes the whole pipeline testable without sockets.

mod error;
pub mod http;
pub mod logging;

pub use error::{
    BuildError, BuildResult, ConfigError, DecodeError, NetworkError, ObserveError, Result,
    TransportError,
};

// Re-export commonly used types at the crate root
pub use http::{
    Decoders, DispatchResult, ErrorBody, HttpMethod, Interceptor, NetworkConfig, NetworkService,
    ParameterEncoding, Pending, RequestDescriptor, Response, ReqwestTransport, TaskId, Transport,
    TransportResponse, WireRequest,
};
pub use logging::{NetworkLogger, TracingLogger};

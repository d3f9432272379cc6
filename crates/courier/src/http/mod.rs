//! HTTP request construction and dispatch.
//!
//! A request travels one way through this module:
//!
//! 1. A [`RequestDescriptor`] is built into a [`WireRequest`] by a
//!    [`BuildRequest`] implementation, encoding its parameters with a
//!    [`ParameterEncoding`].
//! 2. The [`InterceptorChain`] adapts the wire request in registration order.
//! 3. A [`Transport`] performs it on a tokio task tracked by the
//!    [`TaskRegistry`].
//! 4. The response is observed by the interceptors, classified, decoded with
//!    [`Decoders`] and delivered once to the completion handler.
//!
//! # Example
//!
//! ```ignore
//! use courier::http::{NetworkService, RequestDescriptor};
//!
//! let service = NetworkService::with_defaults()?;
//! let descriptor = RequestDescriptor::post("https://api.example.com", "/users")
//!     .parameter("name", "a")
//!     .build();
//!
//! let user = service.submit::<User>(&descriptor).wait().await;
//! ```

mod builder;
mod config;
mod decode;
mod encoding;
mod interceptor;
mod registry;
mod request;
mod response;
mod service;
mod transport;

pub use builder::{BuildRequest, RequestBuilder, compose_url};
pub use config::{NetworkConfig, NetworkConfigBuilder};
pub use decode::{Decoders, FnDecoder, JsonDecoder, ResponseDecoder};
pub use encoding::{CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, Encoded, EncodedPayload, query_value};
pub use interceptor::{AdaptFn, Interceptor, InterceptorChain, ObserveFn, adapt_fn, observe_fn};
pub use registry::{CancelHandle, TaskId, TaskRegistry};
pub use request::{
    DEFAULT_REQUEST_TIMEOUT, HttpMethod, ParameterEncoding, Parameters, RequestDescriptor,
    RequestDescriptorBuilder, WireRequest,
};
pub use response::{
    DispatchResult, ErrorBody, MAX_SUCCESS_STATUS, Response, ResponseHead, TransportResponse,
    classify,
};
pub use service::{NetworkService, Pending};
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Transport, TransportConfig};

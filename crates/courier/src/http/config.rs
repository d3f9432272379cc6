//! Service configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::builder::{BuildRequest, RequestBuilder};
use super::interceptor::{Interceptor, InterceptorChain};
use super::request::DEFAULT_REQUEST_TIMEOUT;
use crate::logging::{NetworkLogger, TracingLogger};

/// Configuration for a [`NetworkService`](super::NetworkService).
///
/// Fixed once the service is built.
#[derive(Clone)]
pub struct NetworkConfig {
    pub(crate) debug: bool,
    pub(crate) timeout: Duration,
    pub(crate) interceptors: InterceptorChain,
    pub(crate) request_builder: Arc<dyn BuildRequest>,
    pub(crate) logger: Arc<dyn NetworkLogger>,
    pub(crate) runtime: Option<Handle>,
}

impl NetworkConfig {
    /// Create a new builder.
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::new()
    }

    /// Whether request/response traces are sent to the logger.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Timeout for raw requests, which carry no descriptor.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The interceptor chain.
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// The request builder.
    pub fn request_builder(&self) -> &Arc<dyn BuildRequest> {
        &self.request_builder
    }

    /// The debug logger.
    pub fn logger(&self) -> &Arc<dyn NetworkLogger> {
        &self.logger
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfigBuilder::new().build()
    }
}

impl std::fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .field("interceptors", &self.interceptors)
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`NetworkConfig`].
///
/// # Example
///
/// ```ignore
/// let config = NetworkConfig::builder()
///     .debug(true)
///     .interceptor(adapt_fn(|mut request| {
///         request.headers.insert(AUTHORIZATION, token.clone());
///         request
///     }))
///     .build();
/// ```
pub struct NetworkConfigBuilder {
    debug: bool,
    timeout: Duration,
    interceptors: InterceptorChain,
    request_builder: Option<Arc<dyn BuildRequest>>,
    logger: Option<Arc<dyn NetworkLogger>>,
    runtime: Option<Handle>,
}

impl NetworkConfigBuilder {
    /// Create a builder with debug mode off and the default timeout.
    pub fn new() -> Self {
        Self {
            debug: false,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            interceptors: InterceptorChain::new(),
            request_builder: None,
            logger: None,
            runtime: None,
        }
    }

    /// Enable or disable request/response tracing.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the timeout used for raw requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append an interceptor. Interceptors run in the order they are added.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Append an already shared interceptor.
    pub fn shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Replace the default [`RequestBuilder`].
    pub fn request_builder(mut self, builder: impl BuildRequest + 'static) -> Self {
        self.request_builder = Some(Arc::new(builder));
        self
    }

    /// Replace the default [`TracingLogger`].
    pub fn logger(mut self, logger: impl NetworkLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Spawn dispatches on this runtime instead of the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> NetworkConfig {
        NetworkConfig {
            debug: self.debug,
            timeout: self.timeout,
            interceptors: self.interceptors,
            request_builder: self
                .request_builder
                .unwrap_or_else(|| Arc::new(RequestBuilder::new())),
            logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
            runtime: self.runtime,
        }
    }
}

impl Default for NetworkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::adapt_fn;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert!(!config.debug());
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.interceptors().is_empty());
        assert!(config.runtime.is_none());
    }

    #[test]
    fn test_interceptors_keep_order() {
        let config = NetworkConfig::builder()
            .debug(true)
            .timeout(Duration::from_secs(5))
            .interceptor(adapt_fn(|request| request))
            .interceptor(adapt_fn(|request| request))
            .build();

        assert!(config.debug());
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.interceptors().len(), 2);
    }
}

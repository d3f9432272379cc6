//! The network service: build, intercept, dispatch, classify, deliver.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::config::NetworkConfig;
use super::decode::Decoders;
use super::registry::{CancelHandle, TaskId, TaskRegistry};
use super::request::{RequestDescriptor, WireRequest};
use super::response::{DispatchResult, TransportResponse, classify};
use super::transport::{ReqwestTransport, Transport};
use crate::error::{ConfigError, NetworkError, TransportError};
use crate::logging::targets;

/// Internal state shared by every clone of a service and its dispatch tasks.
struct ServiceInner {
    config: NetworkConfig,
    transport: Arc<dyn Transport>,
    registry: TaskRegistry,
    runtime: Handle,
}

impl ServiceInner {
    /// Observe and classify a finished transport call.
    fn complete<M, E>(
        &self,
        id: TaskId,
        outcome: Result<TransportResponse, TransportError>,
        decoders: &Decoders<M, E>,
    ) -> DispatchResult<M, E> {
        match &outcome {
            Ok(response) => {
                if self.config.debug {
                    self.config
                        .logger
                        .log_response(response.head.as_ref(), &response.body);
                }
                if let Some(head) = &response.head {
                    self.config.interceptors.observe(head, &response.body);
                }
            }
            Err(e) => {
                tracing::debug!(target: targets::SERVICE, "Task {} transport failure: {}", id, e);
            }
        }
        classify(outcome, decoders)
    }
}

/// A dispatch task's hold on its registry entry.
///
/// Completion claims the entry before delivering. If the task ends any other
/// way the entry is removed on drop, so no entry outlives its dispatch.
struct RegistryEntry {
    inner: Arc<ServiceInner>,
    id: TaskId,
}

impl RegistryEntry {
    /// Take the entry for delivery. `false` if cancel got there first.
    fn claim(&self) -> bool {
        self.inner.registry.take(self.id).is_some()
    }
}

impl Drop for RegistryEntry {
    fn drop(&mut self) {
        if self.inner.registry.take(self.id).is_some() {
            tracing::warn!(target: targets::SERVICE, "Task {} ended without completing", self.id);
        }
    }
}

/// Asynchronous HTTP dispatcher.
///
/// A `NetworkService` builds each [`RequestDescriptor`] into a
/// [`WireRequest`], runs it through the configured interceptors, hands it to
/// the [`Transport`] on a tokio task and delivers exactly one classified
/// result to the completion handler. Every in-flight dispatch is tracked
/// under a [`TaskId`] that can be passed to [`cancel`](Self::cancel).
///
/// The service is cheaply cloneable; clones share the transport and the
/// task registry.
///
/// # Example
///
/// ```ignore
/// let service = NetworkService::with_defaults()?;
///
/// let descriptor = RequestDescriptor::get("https://api.example.com", "/users")
///     .parameter("id", 42)
///     .encoding(ParameterEncoding::UrlForm)
///     .build();
///
/// let id = service.dispatch::<User, _>(&descriptor, |result| match result {
///     Ok(response) => println!("{:?}", response.value),
///     Err(e) => eprintln!("{e}"),
/// });
///
/// // Changed our mind.
/// service.cancel(id);
/// ```
#[derive(Clone)]
pub struct NetworkService {
    inner: Arc<ServiceInner>,
}

impl NetworkService {
    /// Create a service with the given configuration and transport.
    ///
    /// Dispatches are spawned on the runtime from the configuration, or the
    /// runtime this is called from when none was configured.
    pub fn new(config: NetworkConfig, transport: impl Transport + 'static) -> Result<Self, ConfigError> {
        Self::from_shared(config, Arc::new(transport))
    }

    /// Create a service over an already shared transport.
    pub fn from_shared(config: NetworkConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        let runtime = match config.runtime.clone() {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                transport,
                registry: TaskRegistry::new(),
                runtime,
            }),
        })
    }

    /// Create a service with default configuration over [`ReqwestTransport`].
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(NetworkConfig::default(), ReqwestTransport::new()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.inner.config
    }

    /// Dispatch a request and decode a successful body as JSON into `M`.
    ///
    /// Returns [`TaskId::nil()`] if the request could not be built; the
    /// handler has then already been called with
    /// [`NetworkError::InvalidRequest`].
    pub fn dispatch<M, F>(&self, descriptor: &RequestDescriptor, handler: F) -> TaskId
    where
        M: DeserializeOwned + Send + 'static,
        F: FnOnce(DispatchResult<M>) + Send + 'static,
    {
        self.dispatch_with(descriptor, Decoders::json(), handler)
    }

    /// Dispatch a request with explicit model and error decoders.
    pub fn dispatch_with<M, E, F>(
        &self,
        descriptor: &RequestDescriptor,
        decoders: Decoders<M, E>,
        handler: F,
    ) -> TaskId
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnOnce(DispatchResult<M, E>) + Send + 'static,
    {
        let request = match self.inner.config.request_builder.build(descriptor) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(
                    target: targets::SERVICE,
                    "Failed to build {} {}{}: {}",
                    descriptor.method(),
                    descriptor.base_address(),
                    descriptor.path(),
                    e
                );
                handler(Err(NetworkError::InvalidRequest(e)));
                return TaskId::nil();
            }
        };

        self.start(request, decoders, handler)
    }

    /// Fetch `url` with a bodiless GET and deliver the raw body.
    ///
    /// No descriptor or parameter encoding is involved, but interceptors and
    /// classification apply as for [`dispatch`](Self::dispatch).
    pub fn request<F>(&self, url: url::Url, handler: F) -> TaskId
    where
        F: FnOnce(DispatchResult<Bytes>) + Send + 'static,
    {
        let mut request = WireRequest::get(url);
        request.timeout = Some(self.inner.config.timeout);
        self.start(request, Decoders::raw(), handler)
    }

    /// Like [`dispatch`](Self::dispatch), but returns a [`Pending`] that can
    /// be awaited instead of taking a handler.
    pub fn submit<M>(&self, descriptor: &RequestDescriptor) -> Pending<M>
    where
        M: DeserializeOwned + Send + 'static,
    {
        self.submit_with(descriptor, Decoders::json())
    }

    /// Like [`dispatch_with`](Self::dispatch_with), returning a [`Pending`].
    pub fn submit_with<M, E>(&self, descriptor: &RequestDescriptor, decoders: Decoders<M, E>) -> Pending<M, E>
    where
        M: Send + 'static,
        E: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let id = self.dispatch_with(descriptor, decoders, move |result| {
            let _ = result_tx.send(result);
        });
        Pending { id, result_rx }
    }

    /// Cancel an in-flight dispatch.
    ///
    /// Returns `false` if `id` is unknown or already finished. A cancelled
    /// dispatch never calls its handler.
    pub fn cancel(&self, id: TaskId) -> bool {
        let cancelled = self.inner.registry.cancel(id);
        if cancelled {
            tracing::debug!(target: targets::SERVICE, "Cancelled task {}", id);
        } else {
            tracing::trace!(target: targets::SERVICE, "Cancel of unknown task {} ignored", id);
        }
        cancelled
    }

    /// Number of dispatches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.registry.len()
    }

    /// Whether `id` is still in flight.
    pub fn is_in_flight(&self, id: TaskId) -> bool {
        self.inner.registry.contains(id)
    }

    fn start<M, E, F>(&self, request: WireRequest, decoders: Decoders<M, E>, handler: F) -> TaskId
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnOnce(DispatchResult<M, E>) + Send + 'static,
    {
        if self.inner.config.debug {
            self.inner.config.logger.log_request(&request);
        }
        let request = self.inner.config.interceptors.adapt(request);

        // Registered before spawning so completion always finds its entry.
        let id = TaskId::new();
        let (cancel, cancel_rx) = CancelHandle::new();
        self.inner.registry.insert(id, cancel);

        tracing::debug!(
            target: targets::SERVICE,
            "Dispatching {} {} as task {}",
            request.method,
            request.url,
            id
        );

        // Moved into the task so it drops with the future on every exit path,
        // including a panicking transport or a runtime that refuses the task.
        let entry = RegistryEntry {
            inner: self.inner.clone(),
            id,
        };
        self.inner.runtime.spawn(async move {
            let inner = &entry.inner;
            let outcome = tokio::select! {
                outcome = inner.transport.perform(request) => outcome,
                _ = cancel_rx => {
                    tracing::debug!(target: targets::SERVICE, "Task {} aborted", id);
                    return;
                }
            };

            if !entry.claim() {
                tracing::debug!(target: targets::SERVICE, "Task {} cancelled after completion; result dropped", id);
                return;
            }

            handler(inner.complete(id, outcome, &decoders));
        });

        id
    }
}

impl std::fmt::Debug for NetworkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkService")
            .field("config", &self.inner.config)
            .field("in_flight", &self.inner.registry.len())
            .finish()
    }
}

/// A dispatch whose result can be awaited.
///
/// Returned by [`NetworkService::submit`]. Dropping it does not cancel the
/// dispatch; use [`NetworkService::cancel`] with [`id`](Self::id).
pub struct Pending<M, E = Infallible> {
    id: TaskId,
    result_rx: oneshot::Receiver<DispatchResult<M, E>>,
}

impl<M, E> Pending<M, E> {
    /// The dispatch's task id. Nil when the request could not be built.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wait for the result.
    ///
    /// Returns `None` if the dispatch was cancelled, or if its task died
    /// before delivering (a panicking transport, logger or interceptor, or a
    /// runtime that shut down).
    pub async fn wait(self) -> Option<DispatchResult<M, E>> {
        self.result_rx.await.ok()
    }
}

impl<M, E> std::fmt::Debug for Pending<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").field("id", &self.id).finish()
    }
}

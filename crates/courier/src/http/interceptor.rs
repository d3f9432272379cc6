//! Request/response interceptors.
//!
//! Interceptors run in the order they were registered. Before dispatch each
//! one receives the previous one's output (a left fold over the chain); after
//! a response arrives each one observes it for side effects only.

use std::sync::Arc;

use super::request::WireRequest;
use super::response::ResponseHead;
use crate::error::ObserveError;
use crate::logging::targets;

/// A capability that may rewrite outgoing requests and observe responses.
///
/// Both operations default to doing nothing, so an interceptor only needs to
/// implement the side it cares about.
pub trait Interceptor: Send + Sync {
    /// Rewrite an outgoing request. The returned request replaces the input.
    fn adapt(&self, request: WireRequest) -> WireRequest {
        request
    }

    /// Observe a received response.
    ///
    /// A returned error is logged and otherwise ignored; it never fails the
    /// request.
    fn observe(&self, response: &ResponseHead, body: &[u8]) -> Result<(), ObserveError> {
        let _ = (response, body);
        Ok(())
    }
}

/// Interceptor built from an adapt closure. See [`adapt_fn`].
pub struct AdaptFn<F>(F);

impl<F> Interceptor for AdaptFn<F>
where
    F: Fn(WireRequest) -> WireRequest + Send + Sync,
{
    fn adapt(&self, request: WireRequest) -> WireRequest {
        (self.0)(request)
    }
}

/// Interceptor built from an observe closure. See [`observe_fn`].
pub struct ObserveFn<F>(F);

impl<F> Interceptor for ObserveFn<F>
where
    F: Fn(&ResponseHead, &[u8]) -> Result<(), ObserveError> + Send + Sync,
{
    fn observe(&self, response: &ResponseHead, body: &[u8]) -> Result<(), ObserveError> {
        (self.0)(response, body)
    }
}

/// Wrap a closure as an adapt-only interceptor.
///
/// # Example
///
/// ```ignore
/// let stamp = adapt_fn(|mut request| {
///     request.headers.insert("x-client", HeaderValue::from_static("courier"));
///     request
/// });
/// ```
pub fn adapt_fn<F>(f: F) -> AdaptFn<F>
where
    F: Fn(WireRequest) -> WireRequest + Send + Sync,
{
    AdaptFn(f)
}

/// Wrap a closure as an observe-only interceptor.
pub fn observe_fn<F>(f: F) -> ObserveFn<F>
where
    F: Fn(&ResponseHead, &[u8]) -> Result<(), ObserveError> + Send + Sync,
{
    ObserveFn(f)
}

/// An ordered list of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor to the end of the chain.
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Number of interceptors.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run every adapt step in order.
    pub fn adapt(&self, request: WireRequest) -> WireRequest {
        self.interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor.adapt(request))
    }

    /// Run every observe step in order, logging and discarding failures.
    pub fn observe(&self, response: &ResponseHead, body: &[u8]) {
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            if let Err(e) = interceptor.observe(response, body) {
                tracing::warn!(
                    target: targets::HTTP,
                    "Interceptor {} failed to observe HTTP {} response: {}",
                    index,
                    response.status,
                    e
                );
            }
        }
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::HeaderValue;

    use super::*;

    fn request() -> WireRequest {
        WireRequest::get(url::Url::parse("https://api.example.com/users").unwrap())
    }

    fn append(tag: &'static str) -> impl Fn(WireRequest) -> WireRequest + Send + Sync {
        move |mut request| {
            let mut trail = request
                .headers
                .get("x-trail")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            trail.push_str(tag);
            request
                .headers
                .insert("x-trail", HeaderValue::from_str(&trail).unwrap());
            request
        }
    }

    #[test]
    fn test_adapt_runs_in_order() {
        let mut chain = InterceptorChain::new();
        chain.push(Arc::new(adapt_fn(append("A"))));
        chain.push(Arc::new(adapt_fn(append("B"))));

        let adapted = chain.adapt(request());
        assert_eq!(adapted.headers["x-trail"], "AB");
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = InterceptorChain::new();
        let adapted = chain.adapt(request());
        assert_eq!(adapted.url.as_str(), "https://api.example.com/users");
        assert!(adapted.headers.is_empty());
    }

    #[test]
    fn test_observe_failures_are_swallowed() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut chain = InterceptorChain::new();
        chain.push(Arc::new(observe_fn(|_: &ResponseHead, _: &[u8]| {
            Err("token refresh failed".into())
        })));
        let counter = seen.clone();
        chain.push(Arc::new(observe_fn(move |_: &ResponseHead, _: &[u8]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));

        chain.observe(&ResponseHead::new(401), b"");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}

//! Logging facilities for courier.
//!
//! courier uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("courier=debug")
//!     .init();
//! ```
//!
//! When debug mode is enabled on a [`NetworkConfig`](crate::http::NetworkConfig),
//! every built request and every received response is handed to the
//! configured [`NetworkLogger`]. The default, [`TracingLogger`], emits them as
//! `debug` events under [`targets::HTTP`].

use crate::http::{ResponseHead, WireRequest};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Request construction, encoding and classification.
    pub const HTTP: &str = "courier::http";
    /// Dispatch lifecycle.
    pub const SERVICE: &str = "courier::service";
    /// Task registry.
    pub const REGISTRY: &str = "courier::registry";
}

/// Sink for debug-mode request and response traces.
///
/// Logging is best effort: implementations must not panic and their output
/// never affects a dispatch.
pub trait NetworkLogger: Send + Sync {
    /// Record an outgoing request after it was built.
    fn log_request(&self, request: &WireRequest);

    /// Record a received response. `head` is `None` when the transport
    /// returned bytes without a structured HTTP response.
    fn log_response(&self, head: Option<&ResponseHead>, body: &[u8]);
}

/// [`NetworkLogger`] that emits `tracing` debug events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl NetworkLogger for TracingLogger {
    fn log_request(&self, request: &WireRequest) {
        let body = request.body_text().unwrap_or_default();
        tracing::debug!(
            target: targets::HTTP,
            method = %request.method,
            url = %request.url,
            headers = ?request.headers,
            body = %body,
            "Request"
        );
    }

    fn log_response(&self, head: Option<&ResponseHead>, body: &[u8]) {
        let body = String::from_utf8_lossy(body);
        match head {
            Some(head) => tracing::debug!(
                target: targets::HTTP,
                status = head.status,
                headers = ?head.headers,
                body = %body,
                "Response"
            ),
            None => tracing::debug!(
                target: targets::HTTP,
                body = %body,
                "Response without HTTP head"
            ),
        }
    }
}

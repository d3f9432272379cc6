//! Request descriptors and resolved wire requests.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::logging::targets;

/// Default per-request timeout applied by [`RequestDescriptorBuilder`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Parameter mapping carried by a descriptor.
pub type Parameters = serde_json::Map<String, Value>;

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP PATCH method.
    Patch,
    /// HTTP DELETE method.
    Delete,
}

impl HttpMethod {
    /// The method token as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How descriptor parameters are attached to the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterEncoding {
    /// Serialize parameters as a JSON object in the body.
    Json,
    /// Append parameters to the URL as percent-encoded query items.
    UrlForm,
}

/// A caller-authored description of a logical request.
///
/// Descriptors are immutable once built and are consumed by a single
/// dispatch.
///
/// # Example
///
/// ```ignore
/// let descriptor = RequestDescriptor::get("https://api.example.com", "/users")
///     .parameter("id", "42")
///     .encoding(ParameterEncoding::UrlForm)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    base_address: String,
    path: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    parameters: Option<Parameters>,
    rejected_parameters: Vec<(String, String)>,
    encoding: Option<ParameterEncoding>,
    timeout: Duration,
}

impl RequestDescriptor {
    /// Start describing a request with an explicit method.
    pub fn builder(
        method: HttpMethod,
        base_address: impl Into<String>,
        path: impl Into<String>,
    ) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder {
            descriptor: RequestDescriptor {
                base_address: base_address.into(),
                path: path.into(),
                method,
                headers: Vec::new(),
                parameters: None,
                rejected_parameters: Vec::new(),
                encoding: None,
                timeout: DEFAULT_REQUEST_TIMEOUT,
            },
        }
    }

    /// Describe a GET request.
    pub fn get(base_address: impl Into<String>, path: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Get, base_address, path)
    }

    /// Describe a POST request.
    pub fn post(base_address: impl Into<String>, path: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Post, base_address, path)
    }

    /// Describe a PUT request.
    pub fn put(base_address: impl Into<String>, path: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Put, base_address, path)
    }

    /// Describe a PATCH request.
    pub fn patch(base_address: impl Into<String>, path: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Patch, base_address, path)
    }

    /// Describe a DELETE request.
    pub fn delete(base_address: impl Into<String>, path: impl Into<String>) -> RequestDescriptorBuilder {
        Self::builder(HttpMethod::Delete, base_address, path)
    }

    /// The base address, e.g. `https://api.example.com`.
    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// The path appended to the base address.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Caller headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The parameter mapping, if any parameter was supplied.
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Parameters whose values could not be represented, with the reason.
    pub fn rejected_parameters(&self) -> &[(String, String)] {
        &self.rejected_parameters
    }

    /// The explicitly requested encoding.
    pub fn encoding(&self) -> Option<ParameterEncoding> {
        self.encoding
    }

    /// The encoding that will actually be used: JSON unless URL-form was
    /// requested.
    pub fn resolved_encoding(&self) -> ParameterEncoding {
        self.encoding.unwrap_or(ParameterEncoding::Json)
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`RequestDescriptor`].
#[derive(Clone, Debug)]
pub struct RequestDescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl RequestDescriptorBuilder {
    /// Add a header. Later headers with the same name replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.push((name.into(), value.into()));
        self
    }

    /// Add a parameter from any serializable value.
    ///
    /// A value that cannot be represented as JSON is remembered and makes
    /// building the request fail with `EncodingFailed`.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.descriptor
                    .parameters
                    .get_or_insert_with(Parameters::new)
                    .insert(key, value);
            }
            Err(e) => {
                tracing::warn!(target: targets::HTTP, "Parameter '{}' is not representable: {}", key, e);
                self.descriptor.rejected_parameters.push((key, e.to_string()));
            }
        }
        self
    }

    /// Replace the whole parameter mapping.
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.descriptor.parameters = Some(parameters);
        self
    }

    /// Set the parameter encoding.
    pub fn encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.descriptor.encoding = Some(encoding);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.timeout = timeout;
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }
}

/// A fully resolved HTTP request ready for the transport.
///
/// Interceptors replace a wire request wholesale; nothing patches it in place
/// after the transport receives it.
#[derive(Clone, Debug)]
pub struct WireRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute request URL, query included.
    pub url: url::Url,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
    /// Timeout the transport should enforce.
    pub timeout: Option<Duration>,
}

impl WireRequest {
    /// A bodiless GET for the given URL.
    pub fn get(url: url::Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: http::HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// The body as UTF-8 text, lossily, for diagnostics.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tokens() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_reqwest(), reqwest::Method::DELETE);
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = RequestDescriptor::get("https://api.example.com", "/users").build();
        assert_eq!(descriptor.method(), HttpMethod::Get);
        assert!(descriptor.parameters().is_none());
        assert!(descriptor.encoding().is_none());
        assert_eq!(descriptor.resolved_encoding(), ParameterEncoding::Json);
        assert_eq!(descriptor.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_parameters_accept_serializable_values() {
        let descriptor = RequestDescriptor::post("https://api.example.com", "/users")
            .parameter("name", "a")
            .parameter("age", 7)
            .parameter("tags", vec!["x", "y"])
            .build();

        let params = descriptor.parameters().unwrap();
        assert_eq!(params["name"], "a");
        assert_eq!(params["age"], 7);
        assert_eq!(params["tags"], serde_json::json!(["x", "y"]));
        assert!(descriptor.rejected_parameters().is_empty());
    }

    #[test]
    fn test_unrepresentable_parameter_is_recorded() {
        use std::collections::HashMap;

        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");

        let descriptor = RequestDescriptor::post("https://api.example.com", "/users")
            .parameter("bad", bad)
            .build();

        assert_eq!(descriptor.rejected_parameters().len(), 1);
        assert_eq!(descriptor.rejected_parameters()[0].0, "bad");
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let descriptor = RequestDescriptor::get("https://api.example.com", "/")
            .header("X-First", "1")
            .header("X-Second", "2")
            .build();
        assert_eq!(descriptor.headers()[0].0, "X-First");
        assert_eq!(descriptor.headers()[1].0, "X-Second");
    }
}

//! Turning request descriptors into wire requests.

use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use super::encoding::EncodedPayload;
use super::request::{RequestDescriptor, WireRequest};
use crate::error::{BuildError, BuildResult};

/// Capability that resolves a descriptor into a wire request.
///
/// [`RequestBuilder`] is the default; a service can be configured with any
/// other implementation.
pub trait BuildRequest: Send + Sync {
    /// Build the wire request for `descriptor`.
    fn build(&self, descriptor: &RequestDescriptor) -> BuildResult<WireRequest>;
}

/// The default request builder.
///
/// - The scheme is `https` when the base address contains `https`, otherwise
///   `http`.
/// - The descriptor path is appended to the base path verbatim; duplicate
///   slashes are not collapsed.
/// - URL-form parameters become percent-encoded query items (a space is
///   `%20`), JSON parameters become the body.
/// - Caller headers are applied first; the encoder's content type is only
///   added when the caller did not set one.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    /// Create the default builder.
    pub fn new() -> Self {
        Self
    }
}

impl BuildRequest for RequestBuilder {
    fn build(&self, descriptor: &RequestDescriptor) -> BuildResult<WireRequest> {
        if let Some((key, reason)) = descriptor.rejected_parameters().first() {
            return Err(BuildError::EncodingFailed(format!("{key}: {reason}")));
        }

        let mut url = compose_url(descriptor.base_address(), descriptor.path())?;

        let encoded = descriptor
            .parameters()
            .map(|parameters| descriptor.resolved_encoding().encode(parameters))
            .transpose()?;

        let mut body = None;
        let mut content_type = None;
        if let Some(encoded) = encoded {
            match encoded.payload {
                EncodedPayload::Body(bytes) => body = Some(bytes),
                EncodedPayload::Query(pairs) if !pairs.is_empty() => {
                    let items = query_string(&pairs);
                    let query = match url.query() {
                        Some(existing) if !existing.is_empty() => format!("{existing}&{items}"),
                        _ => items,
                    };
                    url.set_query(Some(&query));
                }
                EncodedPayload::Query(_) => {}
            }
            content_type = Some(encoded.content_type);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in descriptor.headers() {
            let name = HeaderName::try_from(name.as_str())?;
            let value = HeaderValue::try_from(value.as_str())?;
            headers.insert(name, value);
        }
        if let Some(content_type) = content_type
            && !headers.contains_key(CONTENT_TYPE)
        {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        Ok(WireRequest {
            method: descriptor.method(),
            url,
            headers,
            body,
            timeout: Some(descriptor.timeout()),
        })
    }
}

/// Compose an absolute URL from a base address and a path.
///
/// The scheme prefix is stripped from the base address, the remainder is split
/// into authority and base path, and the path is concatenated onto the base
/// path without normalization.
pub fn compose_url(base_address: &str, path: &str) -> BuildResult<url::Url> {
    let scheme = if base_address.contains("https") {
        "https"
    } else {
        "http"
    };
    let prefix = format!("{scheme}://");
    let remainder = base_address.strip_prefix(&prefix).unwrap_or(base_address);

    let (authority, base_path) = match remainder.find('/') {
        Some(index) => remainder.split_at(index),
        None => (remainder, ""),
    };
    if authority.is_empty() {
        return Err(BuildError::InvalidUrl(format!(
            "no host in base address '{base_address}'"
        )));
    }
    if !path.is_empty() && !path.starts_with('/') {
        return Err(BuildError::InvalidUrl(format!(
            "path '{path}' must start with '/'"
        )));
    }

    let url = url::Url::parse(&format!("{scheme}://{authority}{base_path}{path}"))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(BuildError::InvalidUrl(format!(
            "no host in base address '{base_address}'"
        )));
    }
    Ok(url)
}

/// Join query items into a percent-encoded query string.
///
/// Spaces are written as `%20` rather than the form-style `+`.
fn query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(component: &str) -> String {
    // Form serialization escapes a literal '+' as %2B, so every '+' left is a space.
    url::form_urlencoded::byte_serialize(component.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

//! Parameter encoding strategies.
//!
//! An encoder reads the caller's parameter mapping and produces either a body
//! or a list of query items, together with the content type to merge into the
//! request headers. The mapping itself is never modified.
//!
//! Query item order follows the mapping's iteration order, which callers must
//! treat as unspecified.

use bytes::Bytes;
use serde_json::Value;

use super::request::{ParameterEncoding, Parameters};
use crate::error::{BuildError, BuildResult};

/// Content type set for JSON-encoded parameters.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type set for URL-form encoded parameters.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Where encoded parameters end up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodedPayload {
    /// A request body.
    Body(Bytes),
    /// Query items to append to the URL, not yet percent-encoded.
    Query(Vec<(String, String)>),
}

/// The output of a parameter encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// The encoded parameters.
    pub payload: EncodedPayload,
    /// Content type to set if the caller did not set one.
    pub content_type: &'static str,
}

impl ParameterEncoding {
    /// Encode a parameter mapping with this strategy.
    pub fn encode(self, parameters: &Parameters) -> BuildResult<Encoded> {
        match self {
            Self::Json => encode_json(parameters),
            Self::UrlForm => Ok(encode_url_form(parameters)),
        }
    }

    /// The content type this strategy sets when absent.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => CONTENT_TYPE_JSON,
            Self::UrlForm => CONTENT_TYPE_FORM,
        }
    }
}

fn encode_json(parameters: &Parameters) -> BuildResult<Encoded> {
    let body =
        serde_json::to_vec(parameters).map_err(|e| BuildError::EncodingFailed(e.to_string()))?;
    Ok(Encoded {
        payload: EncodedPayload::Body(Bytes::from(body)),
        content_type: CONTENT_TYPE_JSON,
    })
}

fn encode_url_form(parameters: &Parameters) -> Encoded {
    let pairs = parameters
        .iter()
        .map(|(key, value)| (key.clone(), query_value(value)))
        .collect();
    Encoded {
        payload: EncodedPayload::Query(pairs),
        content_type: CONTENT_TYPE_FORM,
    }
}

/// Stringify a parameter value for use as a query item.
///
/// Strings are used verbatim, `null` becomes an empty value, and arrays or
/// objects are written as compact JSON.
pub fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_json_body_round_trips() {
        let parameters = params(json!({"name": "a", "count": 3, "nested": {"ok": true}}));
        let encoded = ParameterEncoding::Json.encode(&parameters).unwrap();

        assert_eq!(encoded.content_type, CONTENT_TYPE_JSON);
        let EncodedPayload::Body(body) = encoded.payload else {
            panic!("JSON encoding must produce a body");
        };
        let decoded: Parameters = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, parameters);
    }

    #[test]
    fn test_url_form_produces_query_items() {
        let parameters = params(json!({"id": "42", "page": 2, "flag": false, "none": null}));
        let encoded = ParameterEncoding::UrlForm.encode(&parameters).unwrap();

        assert_eq!(encoded.content_type, CONTENT_TYPE_FORM);
        let EncodedPayload::Query(pairs) = encoded.payload else {
            panic!("URL-form encoding must produce query items");
        };
        let pairs: HashSet<(String, String)> = pairs.into_iter().collect();
        let expected: HashSet<(String, String)> = [
            ("id", "42"),
            ("page", "2"),
            ("flag", "false"),
            ("none", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_encoding_leaves_parameters_untouched() {
        let parameters = params(json!({"id": "42"}));
        let before = parameters.clone();
        let _ = ParameterEncoding::UrlForm.encode(&parameters).unwrap();
        let _ = ParameterEncoding::Json.encode(&parameters).unwrap();
        assert_eq!(parameters, before);
    }

    #[test]
    fn test_query_value_for_composites() {
        assert_eq!(query_value(&json!([1, 2])), "[1,2]");
        assert_eq!(query_value(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(query_value(&json!(1.5)), "1.5");
    }
}

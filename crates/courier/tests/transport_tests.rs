//! Tests for the reqwest-backed transport.

use std::time::Duration;

use courier::http::{ReqwestTransport, TransportConfig};

#[test]
fn test_transport_builder() {
    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .user_agent("courier-tests/1.0")
        .max_redirects(3)
        .build()
        .expect("Failed to build transport");

    let config = transport.config();
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
    assert_eq!(config.user_agent.as_deref(), Some("courier-tests/1.0"));
    assert_eq!(config.max_redirects, 3);
    assert!(config.follow_redirects);
}

#[test]
fn test_transport_config_defaults() {
    let config = TransportConfig::default();
    assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    assert!(config.follow_redirects);
    assert!(config.user_agent.unwrap().starts_with("courier/"));
}

#[test]
fn test_transport_no_redirects() {
    let transport = ReqwestTransport::builder()
        .no_redirects()
        .no_timeout()
        .build()
        .expect("Failed to build transport");
    assert!(!transport.config().follow_redirects);
    assert!(transport.config().timeout.is_none());
}

#[cfg(feature = "integration-tests")]
mod integration_tests {
    use super::*;

    use bytes::Bytes;
    use courier::http::{
        NetworkConfig, NetworkService, ParameterEncoding, RequestDescriptor, Transport,
    };
    use courier::{ErrorBody, NetworkError, TransportError, WireRequest};
    use http::HeaderValue;
    use serde::Deserialize;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ApiError {
        message: String,
    }

    fn service() -> NetworkService {
        let transport = ReqwestTransport::new().expect("Failed to build transport");
        NetworkService::new(NetworkConfig::default(), transport).expect("Failed to build service")
    }

    #[tokio::test]
    async fn test_perform_returns_head_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-request-id", "abc")
                    .set_body_string("Hello, World!"),
            )
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let url = url::Url::parse(&format!("{}/test", mock_server.uri())).unwrap();
        let response = transport
            .perform(WireRequest::get(url))
            .await
            .expect("Request failed");

        let head = response.head.expect("missing response head");
        assert_eq!(head.status, 200);
        assert_eq!(head.header("x-request-id"), Some("abc"));
        assert_eq!(response.body, Bytes::from_static(b"Hello, World!"));
    }

    #[tokio::test]
    async fn test_perform_sends_headers_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("x-api-key", "secret"))
            .and(body_json(serde_json::json!({"name": "a"})))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let mut request = WireRequest::get(url::Url::parse(&format!("{}/echo", mock_server.uri())).unwrap());
        request.method = courier::HttpMethod::Post;
        request.headers.insert("x-api-key", HeaderValue::from_static("secret"));
        request.headers.insert("content-type", HeaderValue::from_static("application/json"));
        request.body = Some(Bytes::from_static(br#"{"name":"a"}"#));

        let response = transport.perform(request).await.expect("Request failed");
        assert_eq!(response.head.map(|h| h.status), Some(201));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::new().unwrap();
        // Nothing listens on the discard port.
        let url = url::Url::parse("http://127.0.0.1:9/").unwrap();
        let result = transport.perform(WireRequest::get(url)).await;
        assert!(matches!(
            result,
            Err(TransportError::Connection(_) | TransportError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let mut request =
            WireRequest::get(url::Url::parse(&format!("{}/slow", mock_server.uri())).unwrap());
        request.timeout = Some(Duration::from_millis(100));

        let err = transport.perform(request).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_service_url_form_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "name": "Ada"
            })))
            .mount(&mock_server)
            .await;

        let descriptor = RequestDescriptor::get(mock_server.uri(), "/users")
            .parameter("id", 42)
            .encoding(ParameterEncoding::UrlForm)
            .build();
        let response = service()
            .submit::<User>(&descriptor)
            .wait()
            .await
            .unwrap()
            .expect("Request failed");

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.value,
            Some(User {
                id: 42,
                name: "Ada".into()
            })
        );
    }

    #[tokio::test]
    async fn test_service_json_post_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"name": "a"})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let descriptor = RequestDescriptor::post(mock_server.uri(), "/users")
            .parameter("name", "a")
            .build();
        let response = service()
            .submit::<User>(&descriptor)
            .wait()
            .await
            .unwrap()
            .expect("Request failed");

        assert_eq!(response.status_code, 204);
        assert!(response.value.is_none());
    }

    #[tokio::test]
    async fn test_service_decodes_error_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "not found"})),
            )
            .mount(&mock_server)
            .await;

        let descriptor = RequestDescriptor::get(mock_server.uri(), "/missing").build();
        let decoders = courier::Decoders::<User>::json().with_json_errors::<ApiError>();
        let result = service()
            .submit_with(&descriptor, decoders)
            .wait()
            .await
            .unwrap();

        match result {
            Err(NetworkError::Server { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(
                    body,
                    ErrorBody::Decoded(ApiError {
                        message: "not found".into()
                    })
                );
            }
            other => panic!("expected a server error, got {other:?}"),
        }
    }
}

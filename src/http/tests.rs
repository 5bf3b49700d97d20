//! Tests for the HTTP client module

use super::*;
use crate::auth::AuthConfig;
use crate::error::Error;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer, retry: RetryPolicy) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .retry(retry)
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert!(config.base_url.is_none());
    assert_eq!(config.retry, RetryPolicy::default());
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    assert!(config.user_agent.starts_with("tap-aircall/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.aircall.io/")
        .timeout(Duration::from_secs(60))
        .retry(RetryPolicy::new(4, Duration::from_secs(5)))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .no_rate_limit()
        .build();

    assert_eq!(config.base_url, Some("https://api.aircall.io/".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.retry.max_tries, 4);
    assert!(config.rate_limit.is_none());
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "2")
        .queries([("per_page", "50"), ("order", "asc")])
        .header("X-Request-Id", "abc123")
        .max_tries(5);

    assert_eq!(config.query.get("page"), Some(&"2".to_string()));
    assert_eq!(config.query.get("per_page"), Some(&"50".to_string()));
    assert_eq!(config.query.get("order"), Some(&"asc".to_string()));
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert_eq!(config.max_tries, Some(5));
}

#[tokio::test]
async fn test_http_client_get_json_with_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls"))
        .and(query_param("from", "1704067200"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "calls": [{"id": 1}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, RetryPolicy::no_retry());
    let body = client
        .get_json(
            "v1/calls",
            RequestConfig::new()
                .query("from", "1704067200")
                .query("order", "asc"),
        )
        .await
        .unwrap();

    assert_eq!(body["calls"][0]["id"], 1);
}

#[tokio::test]
async fn test_http_client_applies_basic_auth_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .and(header("User-Agent", "my-pipeline/2.0"))
        .and(header("X-Request-Id", "req-456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .user_agent("my-pipeline/2.0")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::basic("user", "pass")).unwrap();

    let response = client
        .get_with_config(
            "/v1/users",
            RequestConfig::new().header("X-Request-Id", "req-456"),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_absolute_url_bypasses_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tags"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://example.invalid")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = client
        .get_with_config(&format!("{}/v1/tags", mock_server.uri()), RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_404_is_fatal_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(
        &mock_server,
        RetryPolicy::new(3, Duration::from_millis(10)),
    );
    let err = client.get_with_config("/v1/missing", RequestConfig::new()).await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not found");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_unauthorized_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, RetryPolicy::new(2, Duration::from_millis(10)));
    let err = client.get_with_config("/v1/calls", RequestConfig::new()).await.unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert!(err.to_string().contains("401"));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_http_client_retries_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, RetryPolicy::new(2, Duration::from_millis(10)));
    let body = client
        .get_json("/v1/flaky", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_http_client_retry_bound_with_fixed_wait() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let interval = Duration::from_millis(200);
    let client = test_client(&mock_server, RetryPolicy::new(2, interval));

    let start = Instant::now();
    let err = client.get_with_config("/v1/calls", RequestConfig::new()).await.unwrap_err();
    let elapsed = start.elapsed();

    match err {
        Error::RetriesExhausted {
            attempts,
            status,
            body,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(status, 429);
            assert_eq!(body, "Too Many Requests");
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    // One wait between the two attempts
    assert!(elapsed >= interval);
    assert!(elapsed < interval * 2 + Duration::from_secs(2));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_http_client_per_request_max_tries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, RetryPolicy::new(2, Duration::from_millis(5)));
    let err = client
        .get_with_config("/v1/down", RequestConfig::new().max_tries(3))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted { attempts: 3, .. }));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_http_client_invalid_json_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, RetryPolicy::no_retry());
    let err = client
        .get_json("/v1/broken", RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_http_client_debug_hides_credentials() {
    let client = HttpClient::with_auth(
        HttpClientConfig::builder().no_rate_limit().build(),
        AuthConfig::basic("id", "secret-token"),
    )
    .unwrap();

    let rendered = format!("{client:?}");
    assert!(rendered.contains("has_authenticator: true"));
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("has_rate_limiter: false"));
}

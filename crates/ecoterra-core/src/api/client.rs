//! HTTP transport for the identity API.
//!
//! `HttpTransport` turns an `ApiRequest` into a `reqwest` call against the
//! configured base URL and hands back status plus JSON body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::truncate_body;
use super::{ApiRequest, ApiResponse, Body, Method, Transport, TransportError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting, doubled per retry.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub max_rate_limit_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

/// Transport over `reqwest`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    max_rate_limit_retries: u32,
    initial_backoff: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_options(base_url, TransportOptions::default())
    }

    pub fn with_options(base_url: &str, options: TransportOptions) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_rate_limit_retries: options.max_rate_limit_retries,
            initial_backoff: options.initial_backoff,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: &ApiRequest) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        match &request.body {
            Body::Empty => builder,
            Body::Form(fields) => builder.form(fields),
            Body::Json(value) => builder.json(value),
        }
    }

    /// Read the body as JSON, falling back to `Null` for empty or non-JSON bodies.
    async fn into_api_response(response: reqwest::Response) -> Result<ApiResponse, TransportError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| {
                debug!(status, body = %truncate_body(&text), "Response body is not JSON");
                Value::Null
            })
        };
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self.build(&request).send().await?;

            if response.status().as_u16() != 429 {
                let response = Self::into_api_response(response).await?;
                if !response.is_success() {
                    debug!(
                        path = request.path,
                        status = response.status,
                        body = %truncate_body(&response.body.to_string()),
                        "Request rejected"
                    );
                }
                return Ok(response);
            }

            // Rate limited
            retries += 1;
            if retries > self.max_rate_limit_retries {
                return Err(TransportError::RateLimited(self.max_rate_limit_retries));
            }
            warn!(
                path = request.path,
                retry = retries,
                backoff_ms = backoff.as_millis() as u64,
                "Rate limited, backing off"
            );
            tokio::time::sleep(backoff).await;
            backoff *= 2; // Exponential backoff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_options() -> TransportOptions {
        TransportOptions {
            timeout: Duration::from_secs(5),
            max_rate_limit_retries: 2,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://localhost:3000/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_post_form_sends_urlencoded_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_string_contains("email=user%40test.com"))
            .and(body_string_contains("password=pw123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let request = ApiRequest::post_form(
            "/api/login",
            vec![
                ("email".to_string(), "user@test.com".to_string()),
                ("password".to_string(), "pw123".to_string()),
            ],
        );
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "ok");
    }

    #[tokio::test]
    async fn test_post_json_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(json!({"token": "tok-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let request = ApiRequest::post_json("/api/logout", json!({"token": "tok-1"})).bearer("tok-1");
        let response = transport.send(request).await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let response = transport.send(ApiRequest::get("/api/user")).await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.error_message(), Some("Unauthorized"));
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let response = transport.send(ApiRequest::get("/api/user")).await.unwrap();

        assert_eq!(response.status, 502);
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn test_rate_limited_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let response = transport.send(ApiRequest::get("/api/user")).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_rate_limited_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let transport = HttpTransport::with_options(&server.uri(), fast_options()).unwrap();
        let err = transport.send(ApiRequest::get("/api/user")).await.unwrap_err();
        assert!(matches!(err, TransportError::RateLimited(2)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on the discard port
        let transport = HttpTransport::with_options("http://127.0.0.1:9", fast_options()).unwrap();
        let err = transport.send(ApiRequest::get("/api/user")).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}

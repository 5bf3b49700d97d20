//! HTTP client with retry and rate limiting
//!
//! Provides the HTTP client that handles:
//! - Basic authentication on every request
//! - Fixed-interval retries on rate limits and transient server errors
//! - Rate limiting to stay under the vendor quota
//! - Error classification for retry decisions

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::RetryPolicy;
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest response body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: BTreeMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: BTreeMap::new(),
            user_agent: format!("tap-aircall/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Override the retry budget for this request
    pub max_tries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add several query parameters
    #[must_use]
    pub fn queries<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.query.insert(key.into(), value.into());
        }
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set max tries
    #[must_use]
    pub fn max_tries(mut self, tries: u32) -> Self {
        self.max_tries = Some(tries);
        self
    }
}

/// HTTP client with retry and rate limiting.
///
/// Holds no per-request state, so one instance is shared by every stream of a
/// run (and across tasks when top-level streams run concurrently).
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_authenticator(auth_config);
        Ok(client)
    }

    /// Set the authenticator
    pub fn set_authenticator(&mut self, auth_config: AuthConfig) {
        self.authenticator = if auth_config.is_none() {
            None
        } else {
            Some(Authenticator::new(auth_config))
        };
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, url, config).await
    }

    /// Make a request, retrying transient failures per the retry policy.
    ///
    /// Returns the first successful response. A non-retryable status fails
    /// immediately with [`Error::HttpStatus`]; a retryable status that is
    /// still failing once the budget is spent fails with
    /// [`Error::RetriesExhausted`].
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(url);
        let policy = match config.max_tries {
            Some(max_tries) => RetryPolicy::new(max_tries, self.config.retry.interval),
            None => self.config.retry,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.request(method.clone(), &full_url);

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            for (key, value) in &config.headers {
                req = req.header(key.as_str(), value.as_str());
            }

            if !config.query.is_empty() {
                req = req.query(&config.query);
            }

            if let Some(ref auth) = self.authenticator {
                req = auth.apply(req);
            }

            debug!(?method, url = %full_url, attempt, "Sending request");

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(status = status.as_u16(), url = %full_url, "Request succeeded");
                        return Ok(response);
                    }

                    let code = status.as_u16();
                    let body = snippet(&response.text().await.unwrap_or_default());

                    if code == 401 || code == 403 {
                        return Err(Error::auth(format!(
                            "HTTP {code}, check api_id and api_token: {body}"
                        )));
                    }
                    let err = Error::http_status(code, body.clone());
                    if !err.is_retryable() {
                        return Err(err);
                    }

                    if policy.should_retry(attempt) {
                        let delay = policy.delay(attempt);
                        warn!(
                            "Request failed with {code}, attempt {attempt}/{}, retrying in {delay:?}",
                            policy.max_tries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(Error::RetriesExhausted {
                        attempts: attempt,
                        status: code,
                        body,
                    });
                }
                Err(e) => {
                    let err = Error::Http(e);
                    if err.is_retryable() && policy.should_retry(attempt) {
                        let delay = policy.delay(attempt);
                        warn!(
                            "Request error ({err}), attempt {attempt}/{}, retrying in {delay:?}",
                            policy.max_tries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(err);
                }
            }
        }
    }

    /// Make a GET request and parse the JSON body
    pub async fn get_json(&self, url: &str, config: RequestConfig) -> Result<Value> {
        let response = self.get_with_config(url, config).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| Error::decode(format!("Response from {url} is not valid JSON: {e}")))
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Trim a response body down to something that fits in a log line
fn snippet(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}

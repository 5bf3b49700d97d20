//! Authenticator implementation
//!
//! Handles applying authentication to requests.

use super::types::AuthConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Clone)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Pre-rendered `Authorization` header value
    header: Option<String>,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        let header = match &config {
            AuthConfig::None => None,
            AuthConfig::Basic { username, password } => {
                Some(basic_header_value(username, password))
            }
        };
        Self { config, header }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.header {
            Some(value) => req.header(AUTHORIZATION, value.as_str()),
            None => req,
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Render `Basic base64(username:password)`
pub(crate) fn basic_header_value(username: &str, password: &str) -> String {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

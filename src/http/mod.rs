//! HTTP client module
//!
//! Provides the HTTP client every stream shares.
//!
//! # Features
//!
//! - **Fixed-interval Retries**: Aircall's rate-limit window resets on a fixed
//!   cadence, so the client waits a constant interval between attempts
//! - **Bounded Attempts**: A small retry budget, after which the last status
//!   and body are surfaced to the caller
//! - **Rate Limiting**: Token bucket rate limiter using governor, sized to
//!   the vendor quota of 60 requests per minute
//! - **Authentication**: Integration with the auth module

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;

#[cfg(test)]
mod tests;

//! Authentication module
//!
//! Aircall authenticates every request with HTTP Basic credentials built
//! from the configured `api_id` and `api_token`. One `Authenticator` is
//! created per run and shared by every request the tap issues.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;

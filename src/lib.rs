// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-aircall
//!
//! A Singer tap that extracts calls, users, teams, numbers, contacts and
//! tags from the Aircall public API.
//!
//! ## Features
//!
//! - **Incremental Sync**: `from`/`order=asc` requests resumed from the
//!   stored bookmark, checkpointed after every page
//! - **Pagination**: follows `meta.next_page_link` until it runs out
//! - **Detail Streams**: per-record detail fetches driven by a parent/child
//!   stream graph
//! - **Throttling**: 60 requests per minute, fixed 90 second retry wait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tap_aircall::{
//!     config::TapConfig, engine::SyncEngine, output::JsonLinesSink,
//!     state::StateManager, streams::StreamCatalog,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tap_aircall::Result<()> {
//!     let config = TapConfig::load(&["config.json"])?;
//!     let engine = SyncEngine::new(
//!         Arc::new(config.http_client()?),
//!         Arc::new(StreamCatalog::aircall()?),
//!         StateManager::from_file("state.json")?,
//!         Arc::new(JsonLinesSink::stdout()),
//!     )
//!     .with_config(config.sync_config());
//!
//!     let summary = engine.run().await?;
//!     println!("{} records", summary.records_synced());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              CLI  (--discover, --catalog, --state)              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        SyncEngine: stream graph walk, per-page checkpoints      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   HTTP   │ Paginate  │    Decode     │   State   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Basic    │ next_page │ JSON path     │ Bookmarks │ SCHEMA      │
//! │ Retry    │ _link     │ Epoch → UTC   │ from/to   │ RECORD      │
//! │ Rate lim │           │               │ Partitions│ STATE       │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Basic authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// `meta.next_page_link` pagination
pub mod pagination;

/// Parent/child stream graph
pub mod partition;

/// Record extraction and normalization
pub mod decode;

/// Bookmarks and incremental cursors
pub mod state;

/// Singer message output
pub mod output;

/// Main execution engine
pub mod engine;

/// Tap configuration
pub mod config;

/// Singer catalog documents
pub mod discovery;

/// Path template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

/// JSON schema types
pub mod schema;

/// Aircall stream definitions
pub mod streams;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

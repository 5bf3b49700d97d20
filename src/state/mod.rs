//! State management module
//!
//! Handles bookmarks and the incremental lower bound derived from them.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Singer bookmark document with stream and partition tracking
//! - `StateManager` - Shared, lock-protected access to the run's state
//! - `IncrementalParams` - `from`/`to`/`order` query parameters

mod cursor;
mod manager;
mod types;

pub use cursor::{compute_from_param, IncrementalParams, StartingPoint};
pub use manager::StateManager;
pub use types::{bookmark_timestamp, compare_bookmarks, PartitionState, State, StreamState};

#[cfg(test)]
mod manager_tests;

//! Parent/child stream wiring
//!
//! Detail streams (`user`, `call`, ...) are fetched once per record of
//! their parent listing. This module holds the pieces of that coupling:
//!
//! - [`StreamGraph`] - the validated parent/child DAG
//! - [`ContextMapper`] - turns one parent record into a child context
//! - [`StatePartitioning`] - how a stream's bookmarks are keyed

mod graph;
mod types;

pub use graph::StreamGraph;
pub(crate) use types::describe_context;
pub use types::{ContextMapper, ParentKeyMapper, StatePartitioning};

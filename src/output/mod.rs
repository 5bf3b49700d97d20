//! Output module
//!
//! Singer message types and the sinks that carry them out of the tap.

mod messages;
mod writer;

pub use messages::SingerMessage;
pub use writer::{JsonLinesSink, MemorySink, MessageSink};

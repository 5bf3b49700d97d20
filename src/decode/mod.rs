//! Response decoder module
//!
//! Turns one page of an Aircall response into records.
//!
//! # Overview
//!
//! - [`JsonPath`] locates the record array inside the response envelope
//! - [`JsonDecoder`] parses bodies and yields records lazily, logging the
//!   `meta` section of each page
//! - [`normalize`] rewrites Unix-epoch fields into UTC timestamps

mod decoders;
mod normalize;
mod path;

pub use decoders::{JsonDecoder, Records};
pub use normalize::{epoch_to_timestamp, normalize};
pub use path::{JsonPath, Matches, Segment};

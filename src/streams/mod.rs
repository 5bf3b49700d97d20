//! Stream catalog
//!
//! The twelve Aircall streams: six collections (`calls`, `users`, `teams`,
//! `numbers`, `contacts`, `tags`) and one detail stream per collection,
//! fetched once per parent record.

mod catalog;
mod definition;
mod schemas;

pub use catalog::{aircall_streams, StreamCatalog, API_BASE_URL};
pub use definition::{ParentLink, StreamDefinition, StreamDefinitionBuilder};
pub use schemas::{call_schema, contact_schema, number_schema, tag_schema, team_schema, user_schema};

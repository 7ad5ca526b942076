//! The remote user collection: wire client, cache keys and the cached facade.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod types;

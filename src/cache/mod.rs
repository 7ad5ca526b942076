//! Generic query cache shared by every read the dashboard makes.
//!
//! This module is independent of the user directory:
//! - Serves identical reads from memory inside a staleness window
//! - Deduplicates concurrent reads of the same key
//! - Invalidates whole scopes by prefix after writes, with an optional
//!   broadcast telling on-screen queries to refetch

mod layer;
mod storage;
mod traits;

pub use layer::QueryCache;
pub use storage::{CacheStorage, MemoryStorage};
pub use traits::{CacheResult, CacheSource, Invalidation, QueryKey, RefetchType};

//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Identity of a cached read.
///
/// Keys are grouped by `scope` so that a whole family of reads (every page
/// of the user list, say) can be invalidated by prefix.
pub trait QueryKey {
  /// Stable family name, used as the invalidation prefix
  fn scope(&self) -> &'static str;

  /// Hash of the parameters that distinguish reads within the scope
  fn cache_hash(&self) -> String;

  /// Human-readable description for logs
  fn description(&self) -> String;

  /// Full key under which the read is stored
  fn storage_key(&self) -> String {
    format!("{}:{}", self.scope(), self.cache_hash())
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      cached_at: Some(cached_at),
    }
  }

  /// Create a new cache result for a caller that joined another's request.
  pub fn joined(data: T) -> Self {
    Self {
      data,
      source: CacheSource::InFlight,
      cached_at: None,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Data from cache, still inside the staleness window
  CacheFresh,
  /// Result of a request already in flight for the same key
  InFlight,
}

/// What to do with observers of a scope after invalidating it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchType {
  /// Mark stale only; the next read goes to the network
  None,
  /// Mark stale and tell live observers to refetch now
  Active,
}

/// Broadcast to live observers when a scope is invalidated with
/// [`RefetchType::Active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
  pub prefix: String,
}

impl Invalidation {
  /// Whether an observer of `scope` is affected
  pub fn matches(&self, scope: &str) -> bool {
    scope.starts_with(&self.prefix)
  }
}

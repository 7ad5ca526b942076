//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Type-erased cached value
pub type AnyData = Arc<dyn Any + Send + Sync>;

/// A single cached read.
#[derive(Clone)]
pub struct CachedEntry {
  /// The cached value
  pub data: AnyData,
  /// Wall-clock time the value was stored, for display
  pub cached_at: DateTime<Utc>,
  /// Monotonic time the value was stored, for staleness checks
  pub stored_at: Instant,
  /// Set by invalidation; an invalidated entry is never served
  pub invalidated: bool,
}

impl std::fmt::Debug for CachedEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CachedEntry")
      .field("cached_at", &self.cached_at)
      .field("invalidated", &self.invalidated)
      .finish_non_exhaustive()
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get a cached read by its storage key.
  fn get(&self, key: &str) -> Result<Option<CachedEntry>>;

  /// Store a read, replacing any previous value and clearing invalidation.
  fn store(&self, key: &str, data: AnyData) -> Result<()>;

  /// Mark every entry whose key starts with `prefix` as invalidated.
  /// Returns how many entries were affected.
  fn invalidate_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Process-wide in-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<CachedEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    Ok(entries.get(key).cloned())
  }

  fn store(&self, key: &str, data: AnyData) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.insert(
      key.to_string(),
      CachedEntry {
        data,
        cached_at: Utc::now(),
        stored_at: Instant::now(),
        invalidated: false,
      },
    );

    Ok(())
  }

  fn invalidate_prefix(&self, prefix: &str) -> Result<usize> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut count = 0;
    for (key, entry) in entries.iter_mut() {
      if key.starts_with(prefix) {
        entry.invalidated = true;
        count += 1;
      }
    }

    Ok(count)
  }
}

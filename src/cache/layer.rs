//! Cache layer that orchestrates caching logic with network fetching.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

use super::storage::{AnyData, CacheStorage};
use super::traits::{CacheResult, Invalidation, QueryKey, RefetchType};

type SharedFetch<E> = Shared<BoxFuture<'static, Result<AnyData, E>>>;

/// A network request that other callers for the same key can join
struct InFlight<E> {
  id: u64,
  fetch: SharedFetch<E>,
}

/// Running requests and per-scope invalidation counters, kept under one lock
/// so that joining, registering and invalidating never interleave.
struct Requests<E> {
  running: HashMap<String, InFlight<E>>,
  /// Bumped on every invalidation of a scope; a result started under an
  /// older epoch is not stored
  epochs: HashMap<String, u64>,
}

impl<E> Requests<E> {
  fn epoch(&self, scope: &str) -> u64 {
    self.epochs.get(scope).copied().unwrap_or(0)
  }
}

type SharedRequests<E> = Arc<Mutex<Requests<E>>>;

fn lock<E>(requests: &SharedRequests<E>) -> MutexGuard<'_, Requests<E>> {
  // Entries are plain handles and counters; a poisoned map is still consistent
  requests
    .lock()
    .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client:
/// - identical reads inside the staleness window are served from storage
/// - concurrent reads of one key share a single network call
/// - writes invalidate whole scopes, optionally telling live observers to
///   refetch
pub struct QueryCache<S: CacheStorage, E> {
  storage: Arc<S>,
  requests: SharedRequests<E>,
  /// How long before cached data is considered stale
  stale_time: Duration,
  next_fetch_id: Arc<AtomicU64>,
  invalidations: broadcast::Sender<Invalidation>,
}

impl<S, E> QueryCache<S, E>
where
  S: CacheStorage + 'static,
  E: Clone + Send + Sync + 'static,
{
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    let (invalidations, _) = broadcast::channel(16);
    Self {
      storage: Arc::new(storage),
      requests: Arc::new(Mutex::new(Requests {
        running: HashMap::new(),
        epochs: HashMap::new(),
      })),
      stale_time: Duration::from_secs(30),
      next_fetch_id: Arc::new(AtomicU64::new(0)),
      invalidations,
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Fresh, non-invalidated cache entry: return it without a network call
  /// 2. A request for the same key is already running: wait for its result
  /// 3. Otherwise run `fetcher` and store the result
  ///
  /// Errors are never cached.
  pub async fn fetch<K, T, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>, E>
  where
    K: QueryKey,
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let storage_key = key.storage_key();

    match self.storage.get(&storage_key) {
      Ok(Some(entry)) if !entry.invalidated && entry.stored_at.elapsed() <= self.stale_time => {
        if let Some(data) = entry.data.downcast_ref::<T>() {
          tracing::debug!(query = %key.description(), "cache hit");
          return Ok(CacheResult::from_cache(data.clone(), entry.cached_at));
        }
      }
      Ok(_) => {}
      Err(e) => tracing::warn!(error = %e, "cache read failed, fetching from network"),
    }

    // Join or register under a single guard so two callers cannot both miss
    let (fetch, joined, fetcher) = {
      let mut guard = lock(&self.requests);
      let requests = &mut *guard;
      let registered = match requests.running.get(&storage_key) {
        Some(in_flight) => (in_flight.fetch.clone(), true, Some(fetcher)),
        None => {
          let fetch = self.start_fetch(requests, key.scope(), storage_key.clone(), fetcher());
          (fetch, false, None)
        }
      };
      registered
    };

    if joined {
      tracing::debug!(query = %key.description(), "joining in-flight request");
      let data = fetch.await?;
      if let Ok(data) = data.downcast::<T>() {
        return Ok(CacheResult::joined((*data).clone()));
      }
    } else {
      tracing::debug!(query = %key.description(), "cache miss");
      let data = fetch.await?;
      if let Ok(data) = data.downcast::<T>() {
        return Ok(CacheResult::from_network((*data).clone()));
      }
    }

    // Same key, different type: not shareable, run our own request unshared
    let data = match fetcher {
      Some(fetcher) => fetcher().await?,
      None => unreachable!("a registered fetch has the fetcher's type"),
    };
    Ok(CacheResult::from_network(data))
  }

  /// Register a shared request for `storage_key` and return a handle to it.
  ///
  /// Bookkeeping runs inside the shared future so that it completes even if
  /// the caller that started it goes away.
  fn start_fetch<T, Fut>(
    &self,
    requests: &mut Requests<E>,
    scope: &'static str,
    storage_key: String,
    fut: Fut,
  ) -> SharedFetch<E>
  where
    T: Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let id = self.next_fetch_id.fetch_add(1, Ordering::SeqCst);
    let started_epoch = requests.epoch(scope);
    let storage = Arc::clone(&self.storage);
    let shared_requests = Arc::clone(&self.requests);
    let key = storage_key.clone();

    let fetch = async move {
      let result = fut.await.map(|data| Arc::new(data) as AnyData);

      let mut requests = lock(&shared_requests);
      if let Ok(data) = &result {
        if requests.epoch(scope) == started_epoch {
          if let Err(e) = storage.store(&key, Arc::clone(data)) {
            tracing::warn!(error = %e, "cache write failed");
          }
        }
      }
      if requests.running.get(&key).map(|f| f.id) == Some(id) {
        requests.running.remove(&key);
      }

      result
    }
    .boxed()
    .shared();

    requests.running.insert(
      storage_key,
      InFlight {
        id,
        fetch: fetch.clone(),
      },
    );

    fetch
  }

  /// Invalidate every cached read in `scope`.
  ///
  /// Requests already in flight for the scope are detached: they still
  /// resolve for their callers but their results are not stored, and new
  /// reads start fresh requests. Other scopes are untouched.
  pub fn invalidate(&self, scope: &str, refetch: RefetchType) {
    let prefix = format!("{}:", scope);

    let count = {
      let mut requests = lock(&self.requests);
      *requests.epochs.entry(scope.to_string()).or_insert(0) += 1;
      requests.running.retain(|key, _| !key.starts_with(&prefix));

      match self.storage.invalidate_prefix(&prefix) {
        Ok(count) => count,
        Err(e) => {
          tracing::warn!(error = %e, scope, "cache invalidation failed");
          0
        }
      }
    };

    tracing::debug!(scope, entries = count, ?refetch, "invalidated cache scope");

    if refetch == RefetchType::Active {
      // No receivers simply means nothing is on screen for this scope
      let _ = self.invalidations.send(Invalidation {
        prefix: scope.to_string(),
      });
    }
  }

  /// Subscribe to active invalidations, for views that display cached reads.
  pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
    self.invalidations.subscribe()
  }
}

impl<S: CacheStorage, E> Clone for QueryCache<S, E> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      requests: Arc::clone(&self.requests),
      stale_time: self.stale_time,
      next_fetch_id: Arc::clone(&self.next_fetch_id),
      invalidations: self.invalidations.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::traits::CacheSource;
  use std::sync::atomic::AtomicUsize;

  #[derive(Debug)]
  struct TestKey {
    scope: &'static str,
    n: u32,
  }

  impl QueryKey for TestKey {
    fn scope(&self) -> &'static str {
      self.scope
    }

    fn cache_hash(&self) -> String {
      self.n.to_string()
    }

    fn description(&self) -> String {
      format!("{} {}", self.scope, self.n)
    }
  }

  fn key(scope: &'static str, n: u32) -> TestKey {
    TestKey { scope, n }
  }

  fn cache() -> QueryCache<MemoryStorage, String> {
    QueryCache::new(MemoryStorage::new())
  }

  /// Fetcher returning `value` that counts its invocations
  fn counting(
    calls: &Arc<AtomicUsize>,
    value: u32,
  ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> {
    let calls = Arc::clone(calls);
    move || {
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
      }
      .boxed()
    }
  }

  #[tokio::test]
  async fn test_fresh_entry_served_from_cache() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache.fetch(&key("pages", 1), counting(&calls, 7)).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);

    let second = cache.fetch(&key("pages", 1), counting(&calls, 8)).await.unwrap();
    assert_eq!(second.source, CacheSource::CacheFresh);
    assert_eq!(second.data, 7);
    assert!(second.cached_at.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_distinct_keys_fetch_separately() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(&key("pages", 1), counting(&calls, 1)).await.unwrap();
    let other = cache.fetch(&key("pages", 2), counting(&calls, 2)).await.unwrap();

    assert_eq!(other.data, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_stale_entry_refetched() {
    let cache = cache().with_stale_time(Duration::from_secs(30));
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(&key("pages", 1), counting(&calls, 1)).await.unwrap();

    tokio::time::advance(Duration::from_secs(29)).await;
    let within = cache.fetch(&key("pages", 1), counting(&calls, 2)).await.unwrap();
    assert_eq!(within.data, 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    let after = cache.fetch(&key("pages", 1), counting(&calls, 3)).await.unwrap();
    assert_eq!(after.source, CacheSource::Network);
    assert_eq!(after.data, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_concurrent_reads_share_one_request() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let slow = {
      let calls = Arc::clone(&calls);
      move || {
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          let _ = release_rx.await;
          Ok::<_, String>(99u32)
        }
        .boxed()
      }
    };

    let leader = {
      let cache = cache.clone();
      tokio::spawn(async move { cache.fetch(&key("pages", 1), slow).await })
    };
    // Let the leader register its request
    tokio::task::yield_now().await;

    let follower = {
      let cache = cache.clone();
      let calls = Arc::clone(&calls);
      tokio::spawn(async move { cache.fetch(&key("pages", 1), counting(&calls, 0)).await })
    };
    tokio::task::yield_now().await;

    release_tx.send(()).unwrap();

    let leader = leader.await.unwrap().unwrap();
    let follower = follower.await.unwrap().unwrap();
    assert_eq!(leader.data, 99);
    assert_eq!(follower.data, 99);
    assert_eq!(follower.source, CacheSource::InFlight);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_simultaneous_misses_on_worker_threads_share_one_request() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(tokio::sync::Barrier::new(8));

    let tasks: Vec<_> = (0..8)
      .map(|_| {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
          barrier.wait().await;
          let fetcher = move || {
            async move {
              calls.fetch_add(1, Ordering::SeqCst);
              tokio::time::sleep(Duration::from_millis(50)).await;
              Ok::<_, String>(7u32)
            }
            .boxed()
          };
          cache.fetch(&key("pages", 1), fetcher).await
        })
      })
      .collect();

    for task in tasks {
      assert_eq!(task.await.unwrap().unwrap().data, 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_invalidating_other_scope_keeps_in_flight_result() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let slow = move || {
      async move {
        let _ = release_rx.await;
        Ok::<_, String>(5u32)
      }
      .boxed()
    };

    let pending = {
      let cache = cache.clone();
      tokio::spawn(async move { cache.fetch(&key("stats", 0), slow).await })
    };
    tokio::task::yield_now().await;

    cache.invalidate("users", RefetchType::None);
    cache.invalidate("paginated_users", RefetchType::Active);
    release_tx.send(()).unwrap();
    assert_eq!(pending.await.unwrap().unwrap().data, 5);

    let again = cache
      .fetch(&key("stats", 0), counting(&calls, 6))
      .await
      .unwrap();
    assert_eq!(again.source, CacheSource::CacheFresh);
    assert_eq!(again.data, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_errors_are_not_cached() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let failing = {
      let calls = Arc::clone(&calls);
      move || {
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Err::<u32, _>("boom".to_string())
        }
        .boxed()
      }
    };
    let err = cache.fetch(&key("pages", 1), failing).await.unwrap_err();
    assert_eq!(err, "boom");

    let ok = cache.fetch(&key("pages", 1), counting(&calls, 5)).await.unwrap();
    assert_eq!(ok.source, CacheSource::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_invalidate_forces_network_for_scope_only() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    cache.fetch(&key("paginated_users", 1), counting(&calls, 1)).await.unwrap();
    cache.fetch(&key("stats", 1), counting(&calls, 1)).await.unwrap();

    cache.invalidate("paginated_users", RefetchType::Active);

    let page = cache
      .fetch(&key("paginated_users", 1), counting(&calls, 2))
      .await
      .unwrap();
    assert_eq!(page.source, CacheSource::Network);
    assert_eq!(page.data, 2);

    let stats = cache.fetch(&key("stats", 1), counting(&calls, 3)).await.unwrap();
    assert_eq!(stats.source, CacheSource::CacheFresh);
    assert_eq!(stats.data, 1);
  }

  #[tokio::test]
  async fn test_lazy_invalidation_does_not_notify() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut rx = cache.subscribe();

    cache.fetch(&key("users", 1), counting(&calls, 1)).await.unwrap();
    cache.invalidate("users", RefetchType::None);
    assert!(rx.try_recv().is_err());

    // Still refetched lazily on next read
    let next = cache.fetch(&key("users", 1), counting(&calls, 2)).await.unwrap();
    assert_eq!(next.source, CacheSource::Network);

    cache.invalidate("paginated_users", RefetchType::Active);
    let inv = rx.try_recv().unwrap();
    assert!(inv.matches("paginated_users"));
    assert!(!inv.matches("users"));
  }

  #[tokio::test]
  async fn test_result_started_before_invalidation_is_not_stored() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let slow = move || {
      async move {
        let _ = release_rx.await;
        Ok::<_, String>(1u32)
      }
      .boxed()
    };

    let pending = {
      let cache = cache.clone();
      tokio::spawn(async move { cache.fetch(&key("paginated_users", 1), slow).await })
    };
    tokio::task::yield_now().await;

    cache.invalidate("paginated_users", RefetchType::Active);
    release_tx.send(()).unwrap();
    assert_eq!(pending.await.unwrap().unwrap().data, 1);

    let fresh = cache
      .fetch(&key("paginated_users", 1), counting(&calls, 2))
      .await
      .unwrap();
    assert_eq!(fresh.source, CacheSource::Network);
    assert_eq!(fresh.data, 2);
  }
}

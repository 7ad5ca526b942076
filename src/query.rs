//! Async query abstraction for data fetching in views.
//!
//! Inspired by TanStack Query, this module provides a `Query<K, T>` type that
//! encapsulates keyed async data fetching, loading states, and error handling.
//!
//! # Example
//!
//! ```ignore
//! let client = directory.clone();
//! let mut query = Query::new(move |page: PageQuery| {
//!     let client = client.clone();
//!     async move { client.list_page(&page).await.map_err(|e| e.to_string()) }
//! });
//!
//! // Start fetching for a key; changing the key later fetches again
//! query.fetch(PageQuery::first(10));
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use chrono::{DateTime, Local};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{broadcast, mpsc};

use crate::cache::Invalidation;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data for a key
type FetcherFn<K, T> = Box<dyn Fn(K) -> BoxFuture<T> + Send + Sync>;

/// A completed request, tagged with the sequence number it was issued under
type Completion<T> = (u64, Result<T, String>);

/// Keyed async query with state management.
///
/// Query<K, T> encapsulates:
/// - The fetching logic (via a closure taking the key)
/// - Loading/success/error states
/// - Keeping the previous data visible while a new key loads
/// - Dropping results of superseded requests
/// - Refetching when the cache announces an invalidation of its scope
pub struct Query<K, T> {
  state: QueryState<T>,
  key: Option<K>,
  /// Last successful data, shown while the next request is loading
  previous: Option<T>,
  fetcher: FetcherFn<K, T>,
  tx: mpsc::UnboundedSender<Completion<T>>,
  rx: mpsc::UnboundedReceiver<Completion<T>>,
  /// Sequence number of the most recent request; only its result is accepted
  seq: u64,
  fetched_at: Option<DateTime<Local>>,
  invalidations: Option<(broadcast::Receiver<Invalidation>, &'static str)>,
}

impl<K, T> Query<K, T>
where
  K: Clone + PartialEq + Send + 'static,
  T: Send + 'static,
{
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that takes the key and returns a future. It
  /// is called each time a key is fetched or the query is refetched.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      state: QueryState::Idle,
      key: None,
      previous: None,
      fetcher: Box::new(move |key| Box::pin(fetcher(key))),
      tx,
      rx,
      seq: 0,
      fetched_at: None,
      invalidations: None,
    }
  }

  /// Refetch automatically when `scope` is invalidated with an active refetch.
  pub fn with_invalidations(
    mut self,
    receiver: broadcast::Receiver<Invalidation>,
    scope: &'static str,
  ) -> Self {
    self.invalidations = Some((receiver, scope));
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data to display.
  ///
  /// While loading, this is the previous successful result so that views do
  /// not flash empty between keys.
  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Success(data) => Some(data),
      QueryState::Loading => self.previous.as_ref(),
      _ => None,
    }
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the data shown belongs to an earlier key.
  pub fn is_placeholder(&self) -> bool {
    self.state.is_loading() && self.previous.is_some()
  }

  /// Check if the query succeeded.
  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Get the error message if the query failed.
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// When the current data arrived.
  pub fn fetched_at(&self) -> Option<DateTime<Local>> {
    self.fetched_at
  }

  /// Fetch data for `key`.
  ///
  /// This is a no-op if `key` is already loaded or loading.
  pub fn fetch(&mut self, key: K) {
    if self.key.as_ref() == Some(&key) && (self.is_loading() || self.is_success()) {
      return;
    }
    self.key = Some(key);
    self.start_fetch();
  }

  /// Force a refetch of the current key, even if already loading or data exists.
  pub fn refetch(&mut self) {
    if self.key.is_some() {
      self.start_fetch();
    }
  }

  /// Poll for results from a pending fetch and for invalidations.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    if self.take_invalidation() {
      self.refetch();
      changed = true;
    }

    while let Ok((seq, result)) = self.rx.try_recv() {
      if seq != self.seq {
        // Superseded by a newer request
        continue;
      }
      match result {
        Ok(data) => {
          self.state = QueryState::Success(data);
          self.previous = None;
          self.fetched_at = Some(Local::now());
        }
        Err(error) => {
          self.state = QueryState::Error(error);
          self.previous = None;
        }
      }
      changed = true;
    }

    changed
  }

  /// Drain pending invalidations, reporting whether any concern this query.
  fn take_invalidation(&mut self) -> bool {
    let Some((receiver, scope)) = &mut self.invalidations else {
      return false;
    };

    let mut hit = false;
    loop {
      match receiver.try_recv() {
        Ok(inv) => hit |= inv.matches(*scope),
        // Missed messages might have been for us
        Err(broadcast::error::TryRecvError::Lagged(_)) => hit = true,
        Err(_) => break,
      }
    }
    hit
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    let Some(key) = self.key.clone() else {
      return;
    };

    self.seq += 1;
    let seq = self.seq;

    let state = std::mem::replace(&mut self.state, QueryState::Loading);
    if let QueryState::Success(data) = state {
      self.previous = Some(data);
    }

    let future = (self.fetcher)(key);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the query may have been dropped
      let _ = tx.send((seq, result));
    });
  }
}

impl<K: std::fmt::Debug, T: std::fmt::Debug> std::fmt::Debug for Query<K, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("key", &self.key)
      .field("seq", &self.seq)
      .field("fetched_at", &self.fetched_at)
      .finish_non_exhaustive()
  }
}

//! Cached directory client that wraps DirectoryClient with transparent caching.

use tokio::sync::broadcast;

use crate::cache::{Invalidation, MemoryStorage, QueryCache, RefetchType};
use crate::config::Config;

use super::cache::{
  DirectoryQueryKey, PAGINATED_USERS_SCOPE, STATS_SCOPE, USERS_SCOPE, USER_TYPES_SCOPE,
};
use super::client::DirectoryClient;
use super::error::DirectoryError;
use super::types::{PageQuery, PageResult, Stats, User, UserFields, UserId, UserTypeDistribution};

/// Directory client with transparent caching support.
///
/// Reads go through the query cache. Successful writes invalidate the list
/// scopes so the next read reflects the change.
#[derive(Clone)]
pub struct CachedDirectoryClient {
  inner: DirectoryClient,
  cache: QueryCache<MemoryStorage, DirectoryError>,
}

impl CachedDirectoryClient {
  /// Create a new cached directory client.
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let inner = DirectoryClient::new(config)?;
    let cache = QueryCache::new(MemoryStorage::new()).with_stale_time(config.cache.stale_time());

    Ok(Self::from_parts(inner, cache))
  }

  pub fn from_parts(inner: DirectoryClient, cache: QueryCache<MemoryStorage, DirectoryError>) -> Self {
    Self { inner, cache }
  }

  /// Receive active invalidations for on-screen queries.
  pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
    self.cache.subscribe()
  }

  /// Get one page of users with caching.
  pub async fn list_page(&self, query: &PageQuery) -> Result<PageResult, DirectoryError> {
    let query_key = DirectoryQueryKey::UserPage(query.clone());

    let result = self
      .cache
      .fetch(&query_key, || {
        let inner = self.inner.clone();
        let query = query.clone();
        async move { inner.list_page(&query).await }
      })
      .await?;
    tracing::debug!(
      page = query.page,
      source = ?result.source,
      cached_at = ?result.cached_at,
      "users page"
    );

    Ok(result.data)
  }

  /// Get aggregate stats with caching.
  pub async fn get_stats(&self) -> Result<Stats, DirectoryError> {
    let result = self
      .cache
      .fetch(&DirectoryQueryKey::Stats, || {
        let inner = self.inner.clone();
        async move { inner.get_stats().await }
      })
      .await?;

    Ok(result.data)
  }

  /// Get the user type distribution with caching.
  pub async fn get_user_types(&self) -> Result<UserTypeDistribution, DirectoryError> {
    let result = self
      .cache
      .fetch(&DirectoryQueryKey::UserTypes, || {
        let inner = self.inner.clone();
        async move { inner.get_user_types().await }
      })
      .await?;

    Ok(result.data)
  }

  /// Create a user (not cached - write operation).
  pub async fn create_user(&self, fields: UserFields) -> Result<User, DirectoryError> {
    let user = self
      .inner
      .create_user(&fields)
      .await?;
    tracing::info!(id = %user.id, "user created");
    self.invalidate_lists();
    Ok(user)
  }

  /// Update a user (not cached - write operation).
  pub async fn update_user(&self, id: UserId, fields: UserFields) -> Result<User, DirectoryError> {
    let user = self
      .inner
      .update_user(&id, &fields)
      .await?;
    tracing::info!(%id, "user updated");
    self.invalidate_lists();
    Ok(user)
  }

  /// Delete a user (not cached - write operation).
  pub async fn delete_user(&self, id: UserId) -> Result<UserId, DirectoryError> {
    let id = self
      .inner
      .delete_user(&id)
      .await?;
    tracing::info!(%id, "user deleted");
    self.invalidate_lists();
    Ok(id)
  }

  /// Drop every cached dashboard read and refetch whatever is on screen.
  pub fn refresh(&self) {
    tracing::debug!("manual refresh");
    for scope in [PAGINATED_USERS_SCOPE, STATS_SCOPE, USER_TYPES_SCOPE] {
      self.cache.invalidate(scope, RefetchType::Active);
    }
  }

  /// Full-list reads are only marked stale; paginated reads on screen refetch now.
  fn invalidate_lists(&self) {
    self.cache.invalidate(USERS_SCOPE, RefetchType::None);
    self.cache.invalidate(PAGINATED_USERS_SCOPE, RefetchType::Active);
  }
}

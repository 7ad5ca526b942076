//! Cache keys for directory reads.

use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

use super::types::PageQuery;

/// Scope of unpaginated user list reads
pub const USERS_SCOPE: &str = "users";
/// Scope of paginated user list reads
pub const PAGINATED_USERS_SCOPE: &str = "paginated_users";
pub const STATS_SCOPE: &str = "stats";
pub const USER_TYPES_SCOPE: &str = "user_types";

/// Query key types for directory reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryQueryKey {
  /// One page of the user table
  UserPage(PageQuery),
  /// Aggregate counters
  Stats,
  /// Acquisition channel distribution
  UserTypes,
}

impl QueryKey for DirectoryQueryKey {
  fn scope(&self) -> &'static str {
    match self {
      Self::UserPage(_) => PAGINATED_USERS_SCOPE,
      Self::Stats => STATS_SCOPE,
      Self::UserTypes => USER_TYPES_SCOPE,
    }
  }

  fn cache_hash(&self) -> String {
    let input = match self {
      Self::UserPage(q) => {
        let (sort, order) = q
          .sort
          .map(|s| (s.field.as_param(), s.direction.as_param()))
          .unwrap_or(("", ""));
        format!(
          "page={}&limit={}&q={}&sort={}&order={}",
          q.page,
          q.limit,
          normalize_search(&q.search),
          sort,
          order
        )
      }
      Self::Stats | Self::UserTypes => String::new(),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
  }

  fn description(&self) -> String {
    match self {
      Self::UserPage(q) => {
        let mut desc = format!("users page {} (limit {})", q.page, q.limit);
        if !q.search.is_empty() {
          desc.push_str(&format!(" matching '{}'", q.search));
        }
        if let Some(sort) = q.sort {
          desc.push_str(&format!(
            " by {} {}",
            sort.field.as_param(),
            sort.direction.as_param()
          ));
        }
        desc
      }
      Self::Stats => "stats".to_string(),
      Self::UserTypes => "user types".to_string(),
    }
  }
}

/// Searches differing only in surrounding whitespace share a cache entry.
///
/// Case is kept: the server's `q` matching decides case sensitivity.
fn normalize_search(search: &str) -> &str {
  search.trim()
}

//! Wire-level helpers for the collection resource.
//!
//! These sit between reqwest and the domain types: query parameter
//! construction for list reads, header parsing, and identifier shapes.

use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::types::{PageQuery, UserId};

/// Header carrying the total number of matches for a paginated read
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Identifier as it appears on the wire (number or string)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
  Number(u64),
  Text(String),
}

impl From<ApiId> for UserId {
  fn from(id: ApiId) -> Self {
    match id {
      ApiId::Number(n) => UserId(n.to_string()),
      ApiId::Text(s) => UserId(s),
    }
  }
}

/// Build the query string pairs for a list read.
///
/// `q`, `_sort` and `_order` are left out entirely when there is nothing to
/// send, rather than being sent empty.
pub fn list_params(query: &PageQuery) -> Vec<(&'static str, String)> {
  let mut params = vec![
    ("_page", query.page.to_string()),
    ("_limit", query.limit.to_string()),
  ];

  if !query.search.is_empty() {
    params.push(("q", query.search.clone()));
  }
  if let Some(sort) = query.sort {
    params.push(("_sort", sort.field.as_param().to_string()));
    params.push(("_order", sort.direction.as_param().to_string()));
  }

  params
}

/// Read the total count header, defaulting to 0 when absent or malformed.
pub fn total_count(headers: &HeaderMap) -> u64 {
  headers
    .get(TOTAL_COUNT_HEADER)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.trim().parse::<u64>().ok())
    .unwrap_or(0)
}

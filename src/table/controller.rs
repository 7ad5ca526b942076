use std::collections::BTreeSet;
use std::time::Duration;

use crate::directory::types::{PageQuery, Sort, SortDirection, SortField, UserId};

use super::debounce::Debouncer;
use super::pagination::{total_pages, PageSummary};

/// Interactive state of the user table.
///
/// Owns page, search, sort and selection, and derives the [`PageQuery`]
/// sent to the cache. It does not fetch anything itself: the view feeds the
/// rows of each page result back through [`TableController::set_rows`].
#[derive(Debug)]
pub struct TableController {
  page: u32,
  page_size: u32,
  /// Text in the search box, updated on every keystroke
  search_input: String,
  /// Search actually sent to the server
  committed_search: String,
  debounce: Debouncer<String>,
  sort: Option<Sort>,
  selection: BTreeSet<UserId>,
  /// Ids of the rows currently rendered, in order
  rows: Vec<UserId>,
  /// Page the rendered rows were fetched for; lags `page` while loading
  rows_page: u32,
  total: u64,
}

impl TableController {
  pub fn new(page_size: u32, debounce: Duration) -> Self {
    Self {
      page: 1,
      page_size: page_size.max(1),
      search_input: String::new(),
      committed_search: String::new(),
      debounce: Debouncer::new(debounce),
      sort: None,
      selection: BTreeSet::new(),
      rows: Vec::new(),
      rows_page: 1,
      total: 0,
    }
  }

  /// Parameters for the page currently on display
  pub fn page_query(&self) -> PageQuery {
    PageQuery {
      page: self.page,
      limit: self.page_size,
      search: self.committed_search.clone(),
      sort: self.sort,
    }
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn search_input(&self) -> &str {
    &self.search_input
  }

  pub fn committed_search(&self) -> &str {
    &self.committed_search
  }

  pub fn sort(&self) -> Option<Sort> {
    self.sort
  }

  /// Whether typed text is still waiting to be committed
  pub fn is_search_pending(&self) -> bool {
    self.debounce.is_pending()
  }

  /// Update the search box. The search is committed once typing pauses.
  pub fn set_search_input(&mut self, text: &str) {
    self.search_input = text.to_string();
    self.debounce.push(text.trim().to_string());
  }

  /// Commit a debounced search if its quiet period has elapsed.
  ///
  /// Returns `true` when the committed search changed; the page is then
  /// reset to 1.
  pub fn tick(&mut self) -> bool {
    match self.debounce.poll() {
      Some(search) if search != self.committed_search => {
        self.committed_search = search;
        self.page = 1;
        true
      }
      _ => false,
    }
  }

  /// Activate `field`, or flip the direction if it is already active.
  pub fn toggle_sort(&mut self, field: SortField) {
    self.sort = Some(match self.sort {
      Some(sort) if sort.field == field => Sort {
        field,
        direction: sort.direction.flipped(),
      },
      _ => Sort {
        field,
        direction: SortDirection::Asc,
      },
    });
  }

  pub fn total_pages(&self) -> u64 {
    total_pages(self.total, self.page_size)
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }

  pub fn has_next(&self) -> bool {
    u64::from(self.page) < self.total_pages()
  }

  /// Go back one page. No-op on the first page.
  pub fn previous_page(&mut self) -> bool {
    if !self.has_previous() {
      return false;
    }
    self.page -= 1;
    true
  }

  /// Go forward one page. No-op on the last page.
  pub fn next_page(&mut self) -> bool {
    if !self.has_next() {
      return false;
    }
    self.page += 1;
    true
  }

  /// Record the rows of the latest page result.
  ///
  /// Selection only ever covers rendered rows, so ids that are no longer
  /// on screen drop out of it. The page is not corrected if it is now out
  /// of range.
  pub fn set_rows(&mut self, rows: Vec<UserId>, total: u64) {
    self.selection.retain(|id| rows.contains(id));
    self.rows = rows;
    self.rows_page = self.page;
    self.total = total;
  }

  pub fn rows(&self) -> &[UserId] {
    &self.rows
  }

  /// Range of the rows on screen, which stay those of the previous page
  /// until the next result arrives
  pub fn summary(&self) -> PageSummary {
    PageSummary::new(self.rows_page, self.page_size, self.rows.len(), self.total)
  }

  pub fn is_selected(&self, id: &UserId) -> bool {
    self.selection.contains(id)
  }

  pub fn selection(&self) -> &BTreeSet<UserId> {
    &self.selection
  }

  /// Whether every rendered row is selected (false for an empty page)
  pub fn all_selected(&self) -> bool {
    !self.rows.is_empty() && self.rows.iter().all(|id| self.selection.contains(id))
  }

  /// Select every rendered row, or clear the selection if all are selected.
  pub fn toggle_select_all(&mut self) {
    if self.all_selected() {
      self.selection.clear();
    } else {
      self.selection = self.rows.iter().cloned().collect();
    }
  }

  /// Add or remove a single rendered row.
  pub fn toggle_row(&mut self, id: &UserId) {
    if !self.selection.remove(id) && self.rows.contains(id) {
      self.selection.insert(id.clone());
    }
  }
}

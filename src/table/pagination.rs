use std::fmt;

/// Number of pages needed for `total` rows
pub fn total_pages(total: u64, page_size: u32) -> u64 {
  total.div_ceil(u64::from(page_size.max(1)))
}

/// The "start - end of total" range shown above the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
  pub start: u64,
  pub end: u64,
  pub total: u64,
}

impl PageSummary {
  /// Compute the displayed range for a page.
  ///
  /// `start` and `end` are both 0 when the page rendered no rows.
  pub fn new(page: u32, page_size: u32, rows: usize, total: u64) -> Self {
    if rows == 0 {
      return Self {
        start: 0,
        end: 0,
        total,
      };
    }

    let page = u64::from(page.max(1));
    let size = u64::from(page_size);
    Self {
      start: (page - 1) * size + 1,
      end: (page * size).min(total),
      total,
    }
  }
}

impl fmt::Display for PageSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} - {} of {}", self.start, self.end, self.total)
  }
}

use std::time::Duration;
use tokio::time::Instant;

/// Holds the latest value until input has been quiet for `delay`.
///
/// Each `push` supersedes the pending value and restarts the timer. The
/// owner polls on its tick; dropping the debouncer discards anything
/// pending.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay: Duration,
  pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: None,
    }
  }

  /// Replace the pending value and restart the quiet period.
  pub fn push(&mut self, value: T) {
    self.pending = Some((value, Instant::now() + self.delay));
  }

  /// Take the pending value if its quiet period has elapsed.
  pub fn poll(&mut self) -> Option<T> {
    let ready = matches!(&self.pending, Some((_, deadline)) if Instant::now() >= *deadline);
    if ready {
      self.pending.take().map(|(value, _)| value)
    } else {
      None
    }
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }
}

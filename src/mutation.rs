//! Async write handle for views.
//!
//! The counterpart of [`Query`](crate::query::Query) for writes: `mutate`
//! spawns the request and the view polls for the settled result, so a form
//! can stay open until it knows whether the write went through.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::oneshot;

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

type MutationFn<I, T> = Box<dyn Fn(I) -> BoxFuture<T> + Send + Sync>;

/// Outcome of polling a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus<T> {
  /// Nothing submitted
  Idle,
  /// Write in progress
  Pending,
  /// Write settled successfully
  Success(T),
  /// Write failed with a user-facing message
  Error(String),
}

pub struct Mutation<I, T> {
  mutate_fn: MutationFn<I, T>,
  receiver: Option<oneshot::Receiver<Result<T, String>>>,
}

impl<I, T> Mutation<I, T>
where
  I: Send + 'static,
  T: Send + 'static,
{
  pub fn new<F, Fut>(mutate_fn: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      mutate_fn: Box::new(move |input| Box::pin(mutate_fn(input))),
      receiver: None,
    }
  }

  /// Check whether a write is in flight.
  pub fn is_pending(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start a write. Ignored while another write from this handle is pending.
  pub fn mutate(&mut self, input: I) -> bool {
    if self.is_pending() {
      return false;
    }

    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);

    let future = (self.mutate_fn)(input);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    true
  }

  /// Poll for the settled result of the pending write.
  ///
  /// Returns `Success`/`Error` exactly once per write.
  pub fn poll(&mut self) -> MutationStatus<T> {
    let Some(receiver) = &mut self.receiver else {
      return MutationStatus::Idle;
    };

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        match result {
          Ok(data) => MutationStatus::Success(data),
          Err(e) => MutationStatus::Error(e),
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => MutationStatus::Pending,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.receiver = None;
        MutationStatus::Error("Request was cancelled".to_string())
      }
    }
  }
}

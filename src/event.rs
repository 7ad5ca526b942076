use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal was resized, redraw
  Resize,
  /// Periodic tick for UI refresh and query polling
  Tick,
}

impl Event {
  /// Map a terminal event to an application event, dropping what the UI
  /// doesn't use (mouse, focus, key releases)
  fn from_terminal(event: CrosstermEvent) -> Option<Self> {
    match event {
      CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
      CrosstermEvent::Resize(..) => Some(Event::Resize),
      _ => None,
    }
  }
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Terminal reads block, keep them off the async workers
    tokio::task::spawn_blocking(move || loop {
      let next = match event::poll(tick_rate) {
        Ok(true) => match event::read() {
          Ok(evt) => Event::from_terminal(evt),
          Err(e) => {
            tracing::warn!(error = %e, "failed to read terminal event");
            None
          }
        },
        Ok(false) => Some(Event::Tick),
        Err(e) => {
          tracing::error!(error = %e, "terminal event poll failed");
          break;
        }
      };

      if let Some(event) = next {
        if tx.send(event).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

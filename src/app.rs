use crate::config::Config;
use crate::directory::cached_client::CachedDirectoryClient;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::DashboardView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Header title
  title: String,

  /// The dashboard
  view: Box<dyn View>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = CachedDirectoryClient::new(&config)?;
    let view = DashboardView::new(client, &config.table);

    Ok(Self {
      title: config.display_title(),
      view: Box::new(view),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, &self.title, self.view.as_mut()))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    tracing::info!("shutting down");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {}
      Event::Tick => {}
    }
    // Poll on every event so results land even while keys keep coming
    self.view.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if is_force_quit(&key) {
      self.should_quit = true;
      return;
    }

    match self.view.handle_key(key) {
      ViewAction::Quit => self.should_quit = true,
      ViewAction::None => {}
    }
  }
}

/// Ctrl-C quits from anywhere, including open forms
fn is_force_quit(key: &KeyEvent) -> bool {
  key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_force_quit_key() {
    assert!(is_force_quit(&KeyEvent::new(
      KeyCode::Char('c'),
      KeyModifiers::CONTROL
    )));
    assert!(!is_force_quit(&KeyEvent::new(
      KeyCode::Char('c'),
      KeyModifiers::NONE
    )));
  }
}

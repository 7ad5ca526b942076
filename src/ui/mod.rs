pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::TableState;
use renderfns::{draw_footer, draw_header, visible_shortcuts};
use view::View;

/// Main draw function: header, the view, footer
pub fn draw(frame: &mut Frame, title: &str, view: &mut dyn View) {
  let [header, content, footer] = Layout::vertical([
    Constraint::Length(1), // Header
    Constraint::Min(1),    // Main content
    Constraint::Length(1), // Footer
  ])
  .areas(frame.area());

  let shortcuts = view.shortcuts();
  draw_header(
    frame,
    header,
    title,
    &visible_shortcuts(&shortcuts, view.has_current_item()),
  );

  view.render(frame, content);

  draw_footer(frame, footer, &view.breadcrumb_label(), view.status());
}

/// Keep the cursor on an existing row after the row count changes
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    Some(_) => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = TableState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(9));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}

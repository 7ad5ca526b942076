use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with the view breadcrumb and the latest status
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &str, status: Option<(&str, bool)>) {
  let mut spans = vec![
    Span::raw(" "),
    Span::styled(breadcrumb.to_string(), Style::default().fg(Color::Cyan).bold()),
  ];

  if let Some((message, is_error)) = status {
    let color = if is_error { Color::Red } else { Color::Green };
    spans.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(message.to_string(), Style::default().fg(color)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

use crate::directory::types::Stats;
use crate::query::{Query, QueryState};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Card titles with their values, in display order
pub fn stat_values(stats: &Stats) -> [(&'static str, u64); 4] {
  [
    ("Total Users", stats.total_users),
    ("New Users", stats.new_users),
    ("Top Users", stats.top_users),
    ("Other Users", stats.other_users),
  ]
}

/// Draw the row of aggregate counters
pub fn draw_stat_cards(frame: &mut Frame, area: Rect, query: &Query<(), Stats>) {
  let Some(stats) = query.data() else {
    let (text, color) = match query.state() {
      QueryState::Error(e) => (e.clone(), Color::Red),
      _ => ("Loading...".to_string(), Color::DarkGray),
    };
    let paragraph = Paragraph::new(text)
      .block(Block::default().borders(Borders::ALL).title(" Stats "))
      .style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
    return;
  };

  let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
  for ((title, value), card) in stat_values(stats).into_iter().zip(cards.iter()) {
    let block = Block::default()
      .title(format!(" {} ", title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(Line::styled(
      value.to_string(),
      Style::default().fg(Color::Cyan).bold(),
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(paragraph, *card);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_card_order() {
    let stats = Stats {
      total_users: 100,
      new_users: 10,
      top_users: 5,
      other_users: 85,
    };
    let titles: Vec<_> = stat_values(&stats).iter().map(|(t, _)| *t).collect();
    assert_eq!(
      titles,
      vec!["Total Users", "New Users", "Top Users", "Other Users"]
    );
    assert_eq!(stat_values(&stats)[3].1, 85);
  }
}

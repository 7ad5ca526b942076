use crate::directory::types::{UserType, UserTypeDistribution};
use crate::query::{Query, QueryState};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Presentation of one acquisition channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeStyle {
  pub user_type: UserType,
  pub label: &'static str,
  pub color: Color,
  /// Position among the bars
  pub chart_order: u8,
  /// Position in the legend
  pub legend_order: u8,
}

pub const TYPE_STYLES: [TypeStyle; 3] = [
  TypeStyle {
    user_type: UserType::Organic,
    label: "Organic",
    color: Color::Rgb(0x7B, 0x99, 0xFF),
    chart_order: 2,
    legend_order: 0,
  },
  TypeStyle {
    user_type: UserType::Social,
    label: "Social",
    color: Color::Rgb(0xC9, 0xD7, 0xFD),
    chart_order: 1,
    legend_order: 1,
  },
  TypeStyle {
    user_type: UserType::Direct,
    label: "Direct",
    color: Color::Rgb(0x28, 0xE3, 0x84),
    chart_order: 0,
    legend_order: 2,
  },
];

/// Types present in `dist` with their percentage, sorted by `order`.
/// Types the server did not report are left out.
fn ordered(dist: &UserTypeDistribution, order: fn(&TypeStyle) -> u8) -> Vec<(TypeStyle, f64)> {
  let mut rows: Vec<_> = TYPE_STYLES
    .iter()
    .filter_map(|style| dist.share(style.user_type).map(|pct| (*style, pct)))
    .collect();
  rows.sort_by_key(|(style, _)| order(style));
  rows
}

pub fn chart_rows(dist: &UserTypeDistribution) -> Vec<(TypeStyle, f64)> {
  ordered(dist, |s| s.chart_order)
}

pub fn legend_rows(dist: &UserTypeDistribution) -> Vec<(TypeStyle, f64)> {
  ordered(dist, |s| s.legend_order)
}

/// Total in thousands, rounded down ("2k")
pub fn compact_total(total: u64) -> String {
  format!("{}k", total / 1000)
}

fn bar(pct: f64, width: usize) -> String {
  let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
  format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Draw the acquisition channel chart with its legend
pub fn draw_type_chart(frame: &mut Frame, area: Rect, query: &Query<(), UserTypeDistribution>) {
  let block = Block::default()
    .title(" User Types ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let Some(dist) = query.data() else {
    let (text, color) = match query.state() {
      QueryState::Error(e) => (e.clone(), Color::Red),
      _ => ("Loading...".to_string(), Color::DarkGray),
    };
    let paragraph = Paragraph::new(text)
      .block(block)
      .style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
    return;
  };

  let inner_width = area.width.saturating_sub(2) as usize;
  // label(8) + space + bar + space + "100%"(4)
  let bar_width = inner_width.saturating_sub(14).max(1);

  let mut lines = vec![Line::from(vec![
    Span::styled("Total ", Style::default().fg(Color::DarkGray)),
    Span::styled(compact_total(dist.total_users), Style::default().bold()),
  ])];

  for (style, pct) in chart_rows(dist) {
    lines.push(Line::from(vec![
      Span::raw(format!("{:<8} ", style.label)),
      Span::styled(bar(pct, bar_width), Style::default().fg(style.color)),
      Span::raw(format!(" {:>3.0}%", pct)),
    ]));
  }

  lines.push(Line::raw(""));
  let legend: Vec<Span> = legend_rows(dist)
    .into_iter()
    .flat_map(|(style, pct)| {
      [
        Span::styled("● ", Style::default().fg(style.color)),
        Span::raw(format!("{} {}%  ", style.label, pct)),
      ]
    })
    .collect();
  lines.push(Line::from(legend));

  frame.render_widget(Paragraph::new(lines).block(block), area);
}

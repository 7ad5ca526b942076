use crate::directory::types::{PageQuery, PageResult, Sort, SortDirection, SortField};
use crate::query::Query;
use crate::table::TableController;
use crate::ui::renderfns::{status_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// Column heading with its shortcut number and, when active, the sort arrow
pub fn column_title(index: usize, field: SortField, sort: Option<Sort>) -> String {
  let arrow = match sort {
    Some(s) if s.field == field => match s.direction {
      SortDirection::Asc => " ▲",
      SortDirection::Desc => " ▼",
    },
    _ => "",
  };
  format!("{} {}{}", index + 1, field.title(), arrow)
}

fn checkbox(checked: bool) -> &'static str {
  if checked {
    "[x]"
  } else {
    "[ ]"
  }
}

/// Draw the user table.
///
/// Rows from the previous page stay visible while the next one loads.
pub fn draw_user_table(
  frame: &mut Frame,
  area: Rect,
  query: &Query<PageQuery, PageResult>,
  table: &TableController,
  state: &mut TableState,
) {
  let users = query.data().map(|p| p.users.as_slice()).unwrap_or(&[]);

  let mut title = format!(" Users [{}] ", table.summary());
  if !table.committed_search().is_empty() {
    title.push_str(&format!("/{} ", table.committed_search()));
  }
  if table.is_search_pending() {
    title.push_str("(typing...) ");
  } else if query.is_placeholder() {
    title.push_str("(loading...) ");
  }

  let updated = query
    .fetched_at()
    .map(|at| format!("updated {} ", at.format("%H:%M:%S")))
    .unwrap_or_default();

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .title_bottom(
      Line::from(format!(
        " {}{} page {} of {} {} ",
        updated,
        if table.has_previous() { "◀" } else { " " },
        table.page(),
        table.total_pages().max(1),
        if table.has_next() { "▶" } else { " " },
      ))
      .right_aligned(),
    )
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if users.is_empty() {
    let (content, color) = match query.error() {
      Some(e) => (format!("{}. Press 'r' to retry.", e), Color::Red),
      None if query.is_loading() => ("Loading...".to_string(), Color::DarkGray),
      None => ("No users found.".to_string(), Color::DarkGray),
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
    return;
  }

  let header_style = Style::default().fg(Color::Yellow).bold();
  let mut header_cells = vec![Cell::from(checkbox(table.all_selected()))];
  header_cells.extend(
    SortField::ALL
      .iter()
      .enumerate()
      .map(|(i, field)| Cell::from(column_title(i, *field, table.sort()))),
  );
  let header = Row::new(header_cells).style(header_style);

  let rows: Vec<Row> = users
    .iter()
    .map(|user| {
      let name = Text::from(vec![
        Line::raw(truncate(&user.name, 28)),
        Line::styled(truncate(&user.email, 28), Style::default().fg(Color::DarkGray)),
      ]);
      Row::new(vec![
        Cell::from(checkbox(table.is_selected(&user.id))),
        Cell::from(name),
        Cell::from(user.phone.clone()),
        Cell::from(truncate(user.location.as_deref().unwrap_or("-"), 20)),
        Cell::from(truncate(user.company.as_deref().unwrap_or("-"), 20)),
        Cell::from(Span::styled(
          user.status.label(),
          Style::default().fg(status_color(user.status)),
        )),
      ])
      .height(2)
    })
    .collect();

  let widths = [
    Constraint::Length(3),
    Constraint::Min(20),
    Constraint::Length(16),
    Constraint::Length(20),
    Constraint::Length(20),
    Constraint::Length(10),
  ];

  let widget = Table::new(rows, widths)
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    );

  frame.render_stateful_widget(widget, area, state);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_column_title_marks_active_sort() {
    let sort = Some(Sort {
      field: SortField::Phone,
      direction: SortDirection::Desc,
    });
    assert_eq!(column_title(0, SortField::Name, sort), "1 Name");
    assert_eq!(column_title(1, SortField::Phone, sort), "2 Phone ▼");
    assert_eq!(column_title(1, SortField::Phone, None), "2 Phone");
  }
}

use crate::config::TableConfig;
use crate::directory::cache::{PAGINATED_USERS_SCOPE, STATS_SCOPE, USER_TYPES_SCOPE};
use crate::directory::cached_client::CachedDirectoryClient;
use crate::directory::types::{
  PageQuery, PageResult, SortField, Stats, User, UserId, UserTypeDistribution,
};
use crate::mutation::{Mutation, MutationStatus};
use crate::query::Query;
use crate::table::TableController;
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, FormEvent, FormSubmission, KeyResult, SearchEvent, SearchInput,
  UserForm,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{draw_stat_cards, draw_type_chart, draw_user_table};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::TableState;

/// Stats, user type chart and the paginated user table on one screen
pub struct DashboardView {
  client: CachedDirectoryClient,
  table: TableController,

  // Reads
  page: Query<PageQuery, PageResult>,
  stats: Query<(), Stats>,
  user_types: Query<(), UserTypeDistribution>,

  // Writes
  save: Mutation<FormSubmission, User>,
  delete: Mutation<UserId, UserId>,

  // UI state
  table_state: TableState,
  /// Last outcome for the footer, flagged when it is an error
  status: Option<(String, bool)>,

  // Components
  search: SearchInput,
  form: UserForm,
  confirm: ConfirmDialog<UserId>,
}

impl DashboardView {
  pub fn new(client: CachedDirectoryClient, config: &TableConfig) -> Self {
    let table = TableController::new(config.page_size, config.debounce());

    let page_client = client.clone();
    let mut page = Query::new(move |query: PageQuery| {
      let client = page_client.clone();
      async move { client.list_page(&query).await.map_err(|e| e.to_string()) }
    })
    .with_invalidations(client.subscribe(), PAGINATED_USERS_SCOPE);

    let stats_client = client.clone();
    let mut stats = Query::new(move |()| {
      let client = stats_client.clone();
      async move { client.get_stats().await.map_err(|e| e.to_string()) }
    })
    .with_invalidations(client.subscribe(), STATS_SCOPE);

    let types_client = client.clone();
    let mut user_types = Query::new(move |()| {
      let client = types_client.clone();
      async move { client.get_user_types().await.map_err(|e| e.to_string()) }
    })
    .with_invalidations(client.subscribe(), USER_TYPES_SCOPE);

    let save_client = client.clone();
    let save = Mutation::new(move |submission: FormSubmission| {
      let client = save_client.clone();
      async move {
        match submission {
          FormSubmission::Create(fields) => client.create_user(fields).await,
          FormSubmission::Update(id, fields) => client.update_user(id, fields).await,
        }
        .map_err(|e| e.to_string())
      }
    });

    let delete_client = client.clone();
    let delete = Mutation::new(move |id: UserId| {
      let client = delete_client.clone();
      async move { client.delete_user(id).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    page.fetch(table.page_query());
    stats.fetch(());
    user_types.fetch(());

    Self {
      client,
      table,
      page,
      stats,
      user_types,
      save,
      delete,
      table_state: TableState::default(),
      status: None,
      search: SearchInput::new(),
      form: UserForm::new(),
      confirm: ConfirmDialog::new(),
    }
  }

  /// Rows on screen: the current page, or the previous one while it loads
  fn users(&self) -> &[User] {
    self
      .page
      .data()
      .map(|p| p.users.as_slice())
      .unwrap_or(&[])
  }

  fn selected_user(&self) -> Option<&User> {
    self.users().get(self.table_state.selected()?)
  }

  /// Fetch whatever page the controller now points at
  fn sync_page(&mut self) {
    self.page.fetch(self.table.page_query());
  }

  fn poll_page(&mut self) {
    if !self.page.poll() {
      return;
    }
    if let Some(result) = self.page.data().filter(|_| self.page.is_success()) {
      let ids = result.users.iter().map(|u| u.id.clone()).collect();
      let total = result.total;
      self.table.set_rows(ids, total);
    } else if self.page.is_error() {
      self.table.set_rows(Vec::new(), 0);
    }
  }

  fn poll_mutations(&mut self) {
    match self.save.poll() {
      MutationStatus::Success(user) => {
        self.form.close();
        self.status = Some((format!("Saved {}", user.name), false));
      }
      MutationStatus::Error(e) => self.form.fail(e),
      MutationStatus::Idle | MutationStatus::Pending => {}
    }

    match self.delete.poll() {
      MutationStatus::Success(_) => self.status = Some(("User deleted".to_string(), false)),
      MutationStatus::Error(e) => self.status = Some((e, true)),
      MutationStatus::Idle | MutationStatus::Pending => {}
    }
  }

  // Key handling helpers for or_else chain pattern
  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit(submission)) => {
        if self.save.mutate(submission) {
          self.form.saving();
        }
        return Some(ViewAction::None);
      }
      KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(id)) => {
        if self.delete.mutate(id) {
          self.status = Some(("Deleting...".to_string(), false));
        }
        return Some(ViewAction::None);
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => {
        return Some(ViewAction::None)
      }
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) => {
        self.table.set_search_input(&text);
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.table_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.table_state.select_previous();
        Some(ViewAction::None)
      }
      KeyCode::Char('h') | KeyCode::Left => {
        if self.table.previous_page() {
          self.sync_page();
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('l') | KeyCode::Right => {
        if self.table.next_page() {
          self.sync_page();
        }
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char(c @ '1'..='5') => {
        let index = c as usize - '1' as usize;
        self.table.toggle_sort(SortField::ALL[index]);
        self.sync_page();
        Some(ViewAction::None)
      }
      KeyCode::Char(' ') => {
        if let Some(id) = self.selected_user().map(|u| u.id.clone()) {
          self.table.toggle_row(&id);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('a') => {
        self.table.toggle_select_all();
        Some(ViewAction::None)
      }
      KeyCode::Char('n') => {
        self.form.open_create();
        Some(ViewAction::None)
      }
      KeyCode::Char('e') => {
        if let Some(user) = self.selected_user().cloned() {
          self.form.open_edit(&user);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('d') => {
        if let Some(user) = self.selected_user() {
          let message = format!("Delete {}? This cannot be undone.", user.name);
          let id = user.id.clone();
          self.confirm.show(id, message);
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.status = None;
        self.client.refresh();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Quit),
      _ => None,
    }
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [top, main] = Layout::vertical([Constraint::Length(8), Constraint::Min(5)]).areas(area);
    let [cards, chart] =
      Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(top);

    draw_stat_cards(frame, cards, &self.stats);
    draw_type_chart(frame, chart, &self.user_types);

    let len = self.users().len();
    ensure_valid_selection(&mut self.table_state, len);
    draw_user_table(frame, main, &self.page, &self.table, &mut self.table_state);

    // Overlays last so they sit on top
    self.search.render_overlay(frame, main);
    self.confirm.render_overlay(frame, area);
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    let selected = self.table.selection().len();
    if selected > 0 {
      format!("Users ({} selected)", selected)
    } else {
      "Users".to_string()
    }
  }

  fn status(&self) -> Option<(&str, bool)> {
    if self.form.is_saving() {
      return Some(("Saving...", false));
    }
    self.status.as_ref().map(|(msg, err)| (msg.as_str(), *err))
  }

  fn has_current_item(&self) -> bool {
    self.selected_user().is_some()
  }

  fn tick(&mut self) {
    if self.table.tick() {
      self.sync_page();
    }
    self.poll_page();
    self.stats.poll();
    self.user_types.poll();
    self.poll_mutations();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("n", "new").with_priority(20),
      ShortcutInfo::new("e", "edit").with_priority(30).when_active(),
      ShortcutInfo::new("d", "delete").with_priority(40).when_active(),
      ShortcutInfo::new("1-5", "sort").with_priority(50),
      ShortcutInfo::new("h/l", "page").with_priority(60),
      ShortcutInfo::new("space", "select").with_priority(70).when_active(),
      ShortcutInfo::new("a", "all").with_priority(80),
      ShortcutInfo::new("r", "refresh").with_priority(90),
      ShortcutInfo::new("q", "quit").with_priority(200),
    ]
  }
}

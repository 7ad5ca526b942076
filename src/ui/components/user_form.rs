use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::directory::types::{Status, User, UserFields, UserId};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use thiserror::Error;

/// Why a form submission was rejected before reaching the server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  Required(&'static str),
  #[error("Email must look like name@domain")]
  InvalidEmail,
}

/// Events emitted by the form that the parent view acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Valid input; the view should start the write and call `saving()`
  Submit(FormSubmission),
  /// Form closed without saving
  Cancelled,
}

/// A validated create or update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
  Create(UserFields),
  Update(UserId, UserFields),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Name,
  Email,
  Phone,
  Location,
  Company,
  Status,
}

impl Field {
  const ORDER: [Field; 6] = [
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::Location,
    Field::Company,
    Field::Status,
  ];

  fn label(self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Email => "Email",
      Field::Phone => "Phone",
      Field::Location => "Location",
      Field::Company => "Company",
      Field::Status => "Status",
    }
  }

  fn required(self) -> bool {
    matches!(self, Field::Name | Field::Email | Field::Phone)
  }

  /// Index into the text inputs; status is not a text field
  fn input_index(self) -> Option<usize> {
    match self {
      Field::Name => Some(0),
      Field::Email => Some(1),
      Field::Phone => Some(2),
      Field::Location => Some(3),
      Field::Company => Some(4),
      Field::Status => None,
    }
  }
}

/// Modal for adding or editing a user.
///
/// Stays open while the write is in flight. The parent reports the outcome
/// with `close()` on success or `fail()` on error.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
  active: bool,
  /// Set when editing an existing record
  editing: Option<UserId>,
  inputs: [TextInput; 5],
  status: Status,
  focus: usize,
  saving: bool,
  error: Option<String>,
}

impl UserForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn is_saving(&self) -> bool {
    self.saving
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Open an empty form. Status starts as Offline.
  pub fn open_create(&mut self) {
    *self = Self {
      active: true,
      ..Self::default()
    };
  }

  /// Open the form pre-filled from `user`
  pub fn open_edit(&mut self, user: &User) {
    let text = |v: &Option<String>| TextInput::with_value(v.as_deref().unwrap_or(""));
    *self = Self {
      active: true,
      editing: Some(user.id.clone()),
      inputs: [
        TextInput::with_value(&user.name),
        TextInput::with_value(&user.email),
        TextInput::with_value(&user.phone),
        text(&user.location),
        text(&user.company),
      ],
      status: user.status,
      ..Self::default()
    };
  }

  pub fn close(&mut self) {
    *self = Self::default();
  }

  /// Mark the submitted write as in flight
  pub fn saving(&mut self) {
    self.saving = true;
    self.error = None;
  }

  /// The write failed; keep the input and show `message`
  pub fn fail(&mut self, message: String) {
    self.saving = false;
    self.error = Some(message);
  }

  fn focused(&self) -> Field {
    Field::ORDER[self.focus]
  }

  fn text(&self, field: Field) -> &str {
    field
      .input_index()
      .map(|i| self.inputs[i].value())
      .unwrap_or("")
  }

  fn optional(&self, field: Field) -> Option<String> {
    Some(self.text(field).trim())
      .filter(|v| !v.is_empty())
      .map(String::from)
  }

  /// Check required fields and build the field set to send
  pub fn validate(&self) -> Result<UserFields, ValidationError> {
    for field in Field::ORDER.into_iter().filter(|f| f.required()) {
      if self.text(field).trim().is_empty() {
        return Err(ValidationError::Required(field.label()));
      }
    }

    let email = self.text(Field::Email).trim();
    match email.split_once('@') {
      Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
      _ => return Err(ValidationError::InvalidEmail),
    }

    Ok(UserFields {
      name: self.text(Field::Name).trim().to_string(),
      email: email.to_string(),
      phone: self.text(Field::Phone).trim().to_string(),
      location: self.optional(Field::Location),
      company: self.optional(Field::Company),
      status: self.status,
    })
  }

  fn submit(&mut self) -> KeyResult<FormEvent> {
    match self.validate() {
      Ok(fields) => {
        let submission = match &self.editing {
          Some(id) => FormSubmission::Update(id.clone(), fields),
          None => FormSubmission::Create(fields),
        };
        KeyResult::Event(FormEvent::Submit(submission))
      }
      Err(e) => {
        self.error = Some(e.to_string());
        KeyResult::Handled
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }
    // The write can't be recalled once sent
    if self.saving {
      return KeyResult::Handled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        return KeyResult::Event(FormEvent::Cancelled);
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % Field::ORDER.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + Field::ORDER.len() - 1) % Field::ORDER.len();
        return KeyResult::Handled;
      }
      KeyCode::Enter => return self.submit(),
      _ => {}
    }

    match self.focused().input_index() {
      Some(i) => {
        if self.inputs[i].handle_key(key) == InputResult::Consumed {
          self.error = None;
        }
      }
      None => {
        if matches!(
          key.code,
          KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l')
        ) {
          self.status = self.status.toggled();
        }
      }
    }
    KeyResult::Handled
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = 56.min(area.width);
    let height = (Field::ORDER.len() as u16 + 6).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let title = if self.editing.is_some() {
      " Edit User "
    } else {
      " Add New User "
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = Field::ORDER
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focus && !self.saving;
        let marker = if field.required() { "*" } else { " " };
        let label_style = if focused {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![Span::styled(
          format!("{:>9}{} ", field.label(), marker),
          label_style,
        )];
        match field.input_index() {
          Some(idx) => spans.extend(self.inputs[idx].spans(focused)),
          None => spans.push(Span::styled(
            format!("< {} >", self.status.label()),
            Style::default().fg(crate::ui::renderfns::status_color(self.status)),
          )),
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::raw(""));
    lines.push(match (&self.error, self.saving) {
      (_, true) => {
        let msg = if self.editing.is_some() {
          "Updating..."
        } else {
          "Adding..."
        };
        Line::styled(format!(" {}", msg), Style::default().fg(Color::Yellow))
      }
      (Some(error), false) => Line::styled(format!(" {}", error), Style::default().fg(Color::Red)),
      (None, false) => Line::styled(
        " Enter save  Tab next field  Space toggle status  Esc cancel",
        Style::default().fg(Color::DarkGray),
      ),
    });

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut UserForm, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn fill_required(form: &mut UserForm) {
    type_str(form, "N");
    form.handle_key(key(KeyCode::Tab));
    type_str(form, "e@x.com");
    form.handle_key(key(KeyCode::Tab));
    type_str(form, "1");
  }

  fn sample_user() -> User {
    User {
      id: UserId::from("7"),
      name: "Ann".into(),
      email: "ann@x.com".into(),
      phone: "555".into(),
      location: Some("Oslo".into()),
      company: None,
      status: Status::Online,
    }
  }

  #[test]
  fn test_inactive_form_ignores_keys() {
    let mut form = UserForm::new();
    assert_eq!(form.handle_key(key(KeyCode::Char('n'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_create_defaults_and_submit() {
    let mut form = UserForm::new();
    form.open_create();
    fill_required(&mut form);

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submit(FormSubmission::Create(UserFields {
        name: "N".into(),
        email: "e@x.com".into(),
        phone: "1".into(),
        location: None,
        company: None,
        status: Status::Offline,
      })))
    );
  }

  #[test]
  fn test_missing_required_field_rejected() {
    let mut form = UserForm::new();
    form.open_create();
    type_str(&mut form, "N");

    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.error(), Some("Email is required"));
    assert!(form.is_active());
  }

  #[test]
  fn test_whitespace_only_is_missing() {
    let mut form = UserForm::new();
    form.open_create();
    type_str(&mut form, "   ");
    assert_eq!(form.validate(), Err(ValidationError::Required("Name")));
  }

  #[test]
  fn test_email_needs_at_sign() {
    let mut form = UserForm::new();
    form.open_create();
    type_str(&mut form, "N");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "nobody");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "1");
    assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
  }

  #[test]
  fn test_edit_prefills_and_submits_full_field_set() {
    let mut form = UserForm::new();
    let user = sample_user();
    form.open_edit(&user);

    // Move to Status and toggle it
    for _ in 0..5 {
      form.handle_key(key(KeyCode::Tab));
    }
    form.handle_key(key(KeyCode::Char(' ')));

    let mut expected = UserFields::from(&user);
    expected.status = Status::Offline;
    assert_eq!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submit(FormSubmission::Update(
        UserId::from("7"),
        expected
      )))
    );
  }

  #[test]
  fn test_saving_locks_form_until_settled() {
    let mut form = UserForm::new();
    form.open_create();
    fill_required(&mut form);
    form.saving();

    assert_eq!(form.handle_key(key(KeyCode::Esc)), KeyResult::Handled);
    assert!(form.is_active());

    form.fail("Could not create user".to_string());
    assert!(!form.is_saving());
    assert_eq!(form.error(), Some("Could not create user"));
    assert!(matches!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submit(_))
    ));
  }

  #[test]
  fn test_escape_cancels() {
    let mut form = UserForm::new();
    form.open_create();
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
    assert!(!form.is_active());
  }
}

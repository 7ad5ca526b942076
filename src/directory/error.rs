use thiserror::Error;

/// Failures of directory operations.
///
/// `Display` renders only the fixed user-facing message. The technical
/// `detail` is kept for logs and never shown in the UI.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
  #[error("Could not load users")]
  Fetch { detail: String },

  #[error("Could not load statistics")]
  Stats { detail: String },

  #[error("Could not load user types")]
  UserTypes { detail: String },

  #[error("Could not create user")]
  Create { detail: String },

  #[error("Could not update user")]
  Update { detail: String },

  #[error("Could not delete user")]
  Delete { detail: String },
}

impl DirectoryError {
  pub fn detail(&self) -> &str {
    match self {
      Self::Fetch { detail }
      | Self::Stats { detail }
      | Self::UserTypes { detail }
      | Self::Create { detail }
      | Self::Update { detail }
      | Self::Delete { detail } => detail,
    }
  }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::api_types::ApiId;

/// Server-assigned user identifier.
///
/// The mock resource hands out either numbers or strings, so both are
/// accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "ApiId", into = "String")]
pub struct UserId(pub String);

impl From<UserId> for String {
  fn from(id: UserId) -> Self {
    id.0
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for UserId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

/// Presence status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
  #[serde(alias = "online", alias = "ONLINE")]
  Online,
  #[default]
  #[serde(alias = "offline", alias = "OFFLINE")]
  Offline,
}

impl Status {
  pub fn label(&self) -> &'static str {
    match self {
      Status::Online => "Online",
      Status::Offline => "Offline",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Status::Online => Status::Offline,
      Status::Offline => Status::Online,
    }
  }
}

/// A user record as returned by the collection resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: UserId,
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub company: Option<String>,
  #[serde(default)]
  pub status: Status,
}

/// The editable field set of a user, sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserFields {
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  pub status: Status,
}

impl From<&User> for UserFields {
  fn from(user: &User) -> Self {
    Self {
      name: user.name.clone(),
      email: user.email.clone(),
      phone: user.phone.clone(),
      location: user.location.clone(),
      company: user.company.clone(),
      status: user.status,
    }
  }
}

/// Columns the collection can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
  Name,
  Phone,
  Location,
  Company,
  Status,
}

impl SortField {
  /// Column order in the table
  pub const ALL: [SortField; 5] = [
    SortField::Name,
    SortField::Phone,
    SortField::Location,
    SortField::Company,
    SortField::Status,
  ];

  /// Field name as understood by the `_sort` query parameter
  pub fn as_param(&self) -> &'static str {
    match self {
      SortField::Name => "name",
      SortField::Phone => "phone",
      SortField::Location => "location",
      SortField::Company => "company",
      SortField::Status => "status",
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      SortField::Name => "Name",
      SortField::Phone => "Phone",
      SortField::Location => "Location",
      SortField::Company => "Company",
      SortField::Status => "Status",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn as_param(&self) -> &'static str {
    match self {
      SortDirection::Asc => "asc",
      SortDirection::Desc => "desc",
    }
  }

  pub fn flipped(self) -> Self {
    match self {
      SortDirection::Asc => SortDirection::Desc,
      SortDirection::Desc => SortDirection::Asc,
    }
  }
}

/// Active sort column and its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
  pub field: SortField,
  pub direction: SortDirection,
}

/// Parameters identifying one table view.
///
/// `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
  pub page: u32,
  pub limit: u32,
  pub search: String,
  pub sort: Option<Sort>,
}

impl PageQuery {
  pub fn first(limit: u32) -> Self {
    Self {
      page: 1,
      limit,
      search: String::new(),
      sort: None,
    }
  }
}

/// One page of users plus the total count across all pages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageResult {
  pub users: Vec<User>,
  pub total: u64,
}

/// Aggregate counters shown in the stat cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total_users: u64,
  pub new_users: u64,
  pub top_users: u64,
  pub other_users: u64,
}

/// Acquisition channel of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
  Organic,
  Social,
  Direct,
  /// Any channel the dashboard has no style for; never charted
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
  #[serde(rename = "type")]
  pub user_type: UserType,
  pub percentage: f64,
}

/// Distribution of users across acquisition channels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeDistribution {
  pub total_users: u64,
  #[serde(default)]
  pub distribution: Vec<TypeShare>,
}

impl UserTypeDistribution {
  pub fn share(&self, user_type: UserType) -> Option<f64> {
    self
      .distribution
      .iter()
      .find(|s| s.user_type == user_type)
      .map(|s| s.percentage)
  }
}

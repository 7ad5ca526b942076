use crate::config::Config;
use crate::directory::api_types::{list_params, total_count};
use crate::directory::error::DirectoryError;
use crate::directory::types::{
  PageQuery, PageResult, Stats, User, UserFields, UserId, UserTypeDistribution,
};
use color_eyre::{eyre::eyre, Result};
use url::Url;

/// REST client for the user collection resource
#[derive(Clone)]
pub struct DirectoryClient {
  http: reqwest::Client,
  base: Url,
}

impl DirectoryClient {
  pub fn new(config: &Config) -> Result<Self> {
    Self::with_base_url(&config.api.url)
  }

  pub fn with_base_url(base_url: &str) -> Result<Self> {
    let base = Url::parse(base_url).map_err(|e| eyre!("Invalid API url {}: {}", base_url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("API url {} cannot be used as a base", base_url));
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("userdeck/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// Append path segments to the base URL
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  /// Fetch one page of users
  pub async fn list_page(&self, query: &PageQuery) -> Result<PageResult, DirectoryError> {
    let result = async {
      let response = self
        .http
        .get(self.endpoint(&["users"]))
        .query(&list_params(query))
        .send()
        .await?
        .error_for_status()?;

      let total = total_count(response.headers());
      let users: Vec<User> = response.json().await?;
      Ok::<_, reqwest::Error>(PageResult { users, total })
    }
    .await;

    result
      .map_err(|e| DirectoryError::Fetch {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), page = query.page, "Error fetching users"))
  }

  /// Create a user, returning the record with its server-assigned id
  pub async fn create_user(&self, fields: &UserFields) -> Result<User, DirectoryError> {
    let result = async {
      self
        .http
        .post(self.endpoint(&["users"]))
        .json(fields)
        .send()
        .await?
        .error_for_status()?
        .json::<User>()
        .await
    }
    .await;

    result
      .map_err(|e| DirectoryError::Create {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), "Error creating user"))
  }

  /// Replace the editable fields of a user
  pub async fn update_user(&self, id: &UserId, fields: &UserFields) -> Result<User, DirectoryError> {
    let result = async {
      self
        .http
        .put(self.endpoint(&["users", &id.0]))
        .json(fields)
        .send()
        .await?
        .error_for_status()?
        .json::<User>()
        .await
    }
    .await;

    result
      .map_err(|e| DirectoryError::Update {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), %id, "Error updating user"))
  }

  /// Delete a user. Returns the id rather than the deleted body.
  pub async fn delete_user(&self, id: &UserId) -> Result<UserId, DirectoryError> {
    let result = async {
      self
        .http
        .delete(self.endpoint(&["users", &id.0]))
        .send()
        .await?
        .error_for_status()
    }
    .await;

    result
      .map(|_| id.clone())
      .map_err(|e| DirectoryError::Delete {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), %id, "Error deleting user"))
  }

  /// Fetch the aggregate counters
  pub async fn get_stats(&self) -> Result<Stats, DirectoryError> {
    let result = async {
      self
        .http
        .get(self.endpoint(&["statics"]))
        .send()
        .await?
        .error_for_status()?
        .json::<Stats>()
        .await
    }
    .await;

    result
      .map_err(|e| DirectoryError::Stats {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), "Error fetching stats"))
  }

  /// Fetch the acquisition channel distribution
  pub async fn get_user_types(&self) -> Result<UserTypeDistribution, DirectoryError> {
    let result = async {
      self
        .http
        .get(self.endpoint(&["userTypes"]))
        .send()
        .await?
        .error_for_status()?
        .json::<UserTypeDistribution>()
        .await
    }
    .await;

    result
      .map_err(|e| DirectoryError::UserTypes {
        detail: e.to_string(),
      })
      .inspect_err(|e| tracing::error!(detail = e.detail(), "Error fetching user types"))
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::directory::types::{Sort, SortDirection, SortField, Status};
  use axum::extract::{Path, Query, State};
  use axum::http::StatusCode;
  use axum::response::IntoResponse;
  use axum::routing::get;
  use axum::{Json, Router};
  use serde_json::{json, Value};
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  /// In-process stand-in for the REST resource
  #[derive(Clone, Default)]
  pub(crate) struct MockServer {
    pub list_calls: Arc<AtomicUsize>,
    pub last_params: Arc<Mutex<HashMap<String, String>>>,
    pub omit_total: bool,
  }

  fn user_json(id: u64, name: &str) -> Value {
    json!({
      "id": id,
      "name": name,
      "email": format!("{}@example.com", name.to_lowercase()),
      "phone": "555-0100",
      "location": "Lisbon",
      "company": "Acme",
      "status": "Online"
    })
  }

  async fn list(State(mock): State<MockServer>, Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    mock.list_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_params.lock().unwrap() = params;
    let body = Json(json!([user_json(1, "Ada"), user_json(2, "Grace")]));
    if mock.omit_total {
      body.into_response()
    } else {
      ([("x-total-count", "10")], body).into_response()
    }
  }

  async fn create(Json(mut body): Json<Value>) -> impl IntoResponse {
    body["id"] = json!(42);
    (StatusCode::CREATED, Json(body))
  }

  async fn update(Path(id): Path<String>, Json(mut body): Json<Value>) -> impl IntoResponse {
    body["id"] = json!(id);
    Json(body)
  }

  async fn remove(Path(id): Path<String>) -> impl IntoResponse {
    if id == "404" {
      StatusCode::NOT_FOUND
    } else {
      StatusCode::OK
    }
  }

  async fn stats() -> impl IntoResponse {
    Json(json!({"totalUsers": 25, "newUsers": 3, "topUsers": 5, "otherUsers": 17}))
  }

  async fn user_types() -> impl IntoResponse {
    Json(json!({
      "totalUsers": 25,
      "distribution": [
        {"type": "Organic", "percentage": 50},
        {"type": "Social", "percentage": 30},
        {"type": "Direct", "percentage": 20}
      ]
    }))
  }

  /// Start the mock and return a client pointed at it
  pub(crate) async fn spawn_mock(mock: MockServer) -> DirectoryClient {
    let app = Router::new()
      .route("/users", get(list).post(create))
      .route("/users/{id}", axum::routing::put(update).delete(remove))
      .route("/statics", get(stats))
      .route("/userTypes", get(user_types))
      .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });

    DirectoryClient::with_base_url(&format!("http://{}", addr)).unwrap()
  }

  #[tokio::test]
  async fn test_list_page_reads_total_header() {
    let client = spawn_mock(MockServer::default()).await;

    let page = client.list_page(&PageQuery::first(10)).await.unwrap();
    assert_eq!(page.total, 10);
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.users[0].id, UserId::from("1"));
    assert_eq!(page.users[1].name, "Grace");
  }

  #[tokio::test]
  async fn test_list_page_missing_header_defaults_to_zero() {
    let client = spawn_mock(MockServer {
      omit_total: true,
      ..Default::default()
    })
    .await;

    let page = client.list_page(&PageQuery::first(10)).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.users.len(), 2);
  }

  #[tokio::test]
  async fn test_list_page_sends_only_non_empty_params() {
    let mock = MockServer::default();
    let client = spawn_mock(mock.clone()).await;

    client.list_page(&PageQuery::first(10)).await.unwrap();
    {
      let params = mock.last_params.lock().unwrap();
      assert_eq!(params.get("_page").map(String::as_str), Some("1"));
      assert_eq!(params.get("_limit").map(String::as_str), Some("10"));
      assert!(!params.contains_key("q"));
      assert!(!params.contains_key("_sort"));
      assert!(!params.contains_key("_order"));
    }

    let query = PageQuery {
      page: 2,
      limit: 10,
      search: "ada".to_string(),
      sort: Some(Sort {
        field: SortField::Name,
        direction: SortDirection::Desc,
      }),
    };
    client.list_page(&query).await.unwrap();
    let params = mock.last_params.lock().unwrap();
    assert_eq!(params.get("q").map(String::as_str), Some("ada"));
    assert_eq!(params.get("_sort").map(String::as_str), Some("name"));
    assert_eq!(params.get("_order").map(String::as_str), Some("desc"));
  }

  #[tokio::test]
  async fn test_create_returns_server_record() {
    let client = spawn_mock(MockServer::default()).await;
    let fields = UserFields {
      name: "N".into(),
      email: "e@x.com".into(),
      phone: "1".into(),
      ..Default::default()
    };

    let user = client.create_user(&fields).await.unwrap();
    assert_eq!(user.id, UserId::from("42"));
    assert_eq!(user.name, "N");
    assert_eq!(user.status, Status::Offline);
  }

  #[tokio::test]
  async fn test_update_keys_by_id() {
    let client = spawn_mock(MockServer::default()).await;
    let fields = UserFields {
      name: "Renamed".into(),
      email: "e@x.com".into(),
      phone: "1".into(),
      status: Status::Online,
      ..Default::default()
    };

    let user = client.update_user(&UserId::from("7"), &fields).await.unwrap();
    assert_eq!(user.id, UserId::from("7"));
    assert_eq!(user.name, "Renamed");
  }

  #[tokio::test]
  async fn test_delete_returns_id_and_maps_failure() {
    let client = spawn_mock(MockServer::default()).await;

    let id = client.delete_user(&UserId::from("3")).await.unwrap();
    assert_eq!(id, UserId::from("3"));

    let err = client.delete_user(&UserId::from("404")).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Delete { .. }));
    assert_eq!(err.to_string(), "Could not delete user");
  }

  #[tokio::test]
  async fn test_stats_and_user_types() {
    let client = spawn_mock(MockServer::default()).await;

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_users, 25);
    assert_eq!(stats.other_users, 17);

    let types = client.get_user_types().await.unwrap();
    assert_eq!(types.distribution.len(), 3);
  }

  #[tokio::test]
  async fn test_transport_failure_is_sanitized() {
    // Nothing listens on port 9 (discard) locally
    let client = DirectoryClient::with_base_url("http://127.0.0.1:9").unwrap();

    let err = client.list_page(&PageQuery::first(10)).await.unwrap_err();
    assert_eq!(err.to_string(), "Could not load users");
    assert!(!err.detail().is_empty());
  }

  #[test]
  fn test_endpoint_keeps_base_path() {
    let client = DirectoryClient::with_base_url("http://localhost:3001/api/").unwrap();
    assert_eq!(
      client.endpoint(&["users", "5"]).as_str(),
      "http://localhost:3001/api/users/5"
    );

    let client = DirectoryClient::with_base_url("http://localhost:3001").unwrap();
    assert_eq!(
      client.endpoint(&["users"]).as_str(),
      "http://localhost:3001/users"
    );
  }
}

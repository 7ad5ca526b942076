use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the REST base URL
pub const API_URL_ENV: &str = "USERDECK_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub table: TableConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the REST resource, e.g. http://localhost:3001
  #[serde(default = "default_api_url")]
  pub url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
    }
  }
}

fn default_api_url() -> String {
  "http://localhost:3001".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
  #[serde(default = "default_page_size")]
  pub page_size: u32,
  /// Quiet period before a search is sent
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
}

impl Default for TableConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
      debounce_ms: default_debounce_ms(),
    }
  }
}

impl TableConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

fn default_page_size() -> u32 {
  10
}

fn default_debounce_ms() -> u64 {
  300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long a cached read is served without going to the network
  #[serde(default = "default_stale_secs")]
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_secs: default_stale_secs(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_secs)
  }
}

fn default_stale_secs() -> u64 {
  30
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./userdeck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/userdeck/config.yaml
  ///
  /// Falls back to built-in defaults when no file exists. The API URL is
  /// then taken from `USERDECK_API_URL` if set. Nothing is validated yet;
  /// see [`Config::with_overrides`].
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.api.url = url;
    }

    Ok(config)
  }

  /// Apply command line values on top of file and environment, then
  /// validate the result.
  pub fn with_overrides(mut self, api_url: Option<String>, page_size: Option<u32>) -> Result<Self> {
    if let Some(url) = api_url {
      self.api.url = url;
    }
    if let Some(page_size) = page_size {
      self.table.page_size = page_size;
    }
    self.validate()?;
    Ok(self)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("userdeck.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("userdeck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Check values that serde cannot.
  pub fn validate(&self) -> Result<()> {
    Url::parse(&self.api.url).map_err(|e| eyre!("Invalid API url {}: {}", self.api.url, e))?;

    if self.table.page_size == 0 {
      return Err(eyre!("table.page_size must be at least 1"));
    }

    Ok(())
  }

  /// Header title: configured title or the host part of the API URL
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    Url::parse(&self.api.url)
      .ok()
      .and_then(|u| {
        let host = u.host_str()?.to_string();
        Some(match u.port() {
          Some(port) => format!("{}:{}", host, port),
          None => host,
        })
      })
      .unwrap_or_else(|| self.api.url.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_from_empty_yaml() {
    let config = Config::from_yaml("{}").unwrap();
    assert_eq!(config.api.url, "http://localhost:3001");
    assert_eq!(config.table.page_size, 10);
    assert_eq!(config.table.debounce(), Duration::from_millis(300));
    assert_eq!(config.cache.stale_time(), Duration::from_secs(30));
  }

  #[test]
  fn test_partial_yaml() {
    let config = Config::from_yaml(
      "api:\n  url: https://api.example.com/v1\ntable:\n  page_size: 25\n",
    )
    .unwrap();
    assert_eq!(config.api.url, "https://api.example.com/v1");
    assert_eq!(config.table.page_size, 25);
    assert_eq!(config.table.debounce_ms, 300);
  }

  #[test]
  fn test_validate_rejects_zero_page_size() {
    let mut config = Config::default();
    config.table.page_size = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_bad_url() {
    let mut config = Config::default();
    config.api.url = "not a url".to_string();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_overrides_replace_invalid_values_before_validation() {
    let mut config = Config::default();
    config.api.url = "not a url".to_string();
    config.table.page_size = 0;

    let config = config
      .with_overrides(Some("http://10.0.0.5:3001".to_string()), Some(20))
      .unwrap();
    assert_eq!(config.api.url, "http://10.0.0.5:3001");
    assert_eq!(config.table.page_size, 20);
  }

  #[test]
  fn test_overrides_still_validated() {
    let result = Config::default().with_overrides(None, Some(0));
    assert!(result.is_err());
  }

  #[test]
  fn test_display_title() {
    let mut config = Config::default();
    assert_eq!(config.display_title(), "localhost:3001");

    config.api.url = "https://users.example.com/api".to_string();
    assert_eq!(config.display_title(), "users.example.com");

    config.title = Some("Directory".to_string());
    assert_eq!(config.display_title(), "Directory");
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub remote: RemoteConfig,
  #[serde(rename = "static")]
  pub static_files: StaticConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Base url of the document-store API
  pub url: String,
  /// How long the resolver waits for the remote tier before falling back
  #[serde(default = "default_remote_timeout_ms")]
  pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
  /// Base url the packaged /bible_data tree is served from
  pub url: String,
  /// Per-request timeout for static file fetches
  #[serde(default = "default_static_timeout_ms")]
  pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Override for the cache database path (default: data dir)
  pub path: Option<PathBuf>,
}

fn default_remote_timeout_ms() -> u64 {
  2500
}

fn default_static_timeout_ms() -> u64 {
  2000
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./versecache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/versecache/config.yaml
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/versecache/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("versecache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("versecache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Url::parse(&config.remote.url)
      .map_err(|e| eyre!("Invalid remote url {}: {}", config.remote.url, e))?;
    Url::parse(&config.static_files.url)
      .map_err(|e| eyre!("Invalid static url {}: {}", config.static_files.url, e))?;

    Ok(config)
  }

  /// Get the optional bearer token for the remote collection.
  ///
  /// Checks VERSECACHE_TOKEN first, then BIBLE_API_TOKEN as fallback.
  pub fn api_token() -> Option<String> {
    std::env::var("VERSECACHE_TOKEN")
      .or_else(|_| std::env::var("BIBLE_API_TOKEN"))
      .ok()
  }
}

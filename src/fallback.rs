//! Packaged static chapter files, the last resolution tier.
//!
//! Static files predate the remote collection and only carry each
//! language's canonical translation, so the resolver consults this tier
//! only for default versions.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use color_eyre::{eyre::eyre, Result};

use crate::config::Config;
use crate::remote::ids;
use crate::types::{parse_verse_map, ChapterContent, ChapterKey};

/// Trait over the static tier. Any failure is a miss; nothing here is
/// worth surfacing past the resolver.
pub trait StaticSource {
  async fn fetch(&self, key: &ChapterKey) -> Option<ChapterContent>;
}

/// Static source reading `/bible_data/{lang}/{book}/{chapter}.json` over
/// HTTP with a short per-request timeout.
#[derive(Clone)]
pub struct HttpStaticSource {
  http: reqwest::Client,
  base: Url,
}

impl HttpStaticSource {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_millis(config.static_files.timeout_ms))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let base = Url::parse(&config.static_files.url)
      .map_err(|e| eyre!("Invalid static url {}: {}", config.static_files.url, e))?;

    Ok(Self { http, base })
  }

  fn chapter_url(&self, key: &ChapterKey) -> Option<Url> {
    let path = chapter_path(key);
    self.base.join(&path).ok()
  }
}

/// Path of a chapter file below the static base
fn chapter_path(key: &ChapterKey) -> String {
  format!(
    "/bible_data/{}/{}/{}.json",
    key.language.as_str(),
    ids::underscored(key.book.trim()),
    key.chapter
  )
}

impl StaticSource for HttpStaticSource {
  async fn fetch(&self, key: &ChapterKey) -> Option<ChapterContent> {
    let url = self.chapter_url(key)?;

    let resp = match self.http.get(url.clone()).send().await {
      Ok(resp) => resp,
      Err(e) => {
        debug!("static fetch failed for {}: {}", url, e);
        return None;
      }
    };

    if !resp.status().is_success() {
      return None;
    }

    match resp.json::<BTreeMap<String, String>>().await {
      Ok(verses) => Some(parse_verse_map(verses)),
      Err(e) => {
        debug!("static chapter at {} is malformed: {}", url, e);
        None
      }
    }
  }
}

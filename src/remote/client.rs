use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::canon;
use crate::config::Config;
use crate::types::{ChapterContent, ChapterKey, Language};

use super::api_types::{ApiBatchEntry, ApiChapterDocument};
use super::ids;
use super::RemoteSource;

/// Documents per batch write
const BATCH_SIZE: usize = 25;
/// Pause between batch writes to bound load on the collection
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// HTTP client for the bible_chapters collection
#[derive(Clone)]
pub struct RemoteClient {
  http: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl RemoteClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let mut base = Url::parse(&config.remote.url)
      .map_err(|e| eyre!("Invalid remote url {}: {}", config.remote.url, e))?;

    // Url::join treats a path without a trailing slash as a file
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    Ok(Self {
      http,
      base,
      token: Config::api_token(),
    })
  }

  fn get(&self, url: Url) -> reqwest::RequestBuilder {
    let req = self.http.get(url);
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Fetch one document by id. 404 is a miss, not an error.
  async fn get_document(&self, id: &str) -> Result<Option<ApiChapterDocument>> {
    let url = self
      .base
      .join(&format!("bible_chapters/{}", id))
      .map_err(|e| eyre!("Invalid document id {}: {}", id, e))?;

    let resp = self
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch document {}: {}", id, e))?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }

    let doc = resp
      .error_for_status()
      .map_err(|e| eyre!("Document {} fetch failed: {}", id, e))?
      .json::<ApiChapterDocument>()
      .await
      .map_err(|e| eyre!("Failed to parse document {}: {}", id, e))?;

    Ok(Some(doc))
  }

  /// Run a filtered query against the collection.
  async fn query(&self, params: &[(&str, String)]) -> Result<Vec<ApiChapterDocument>> {
    let url = self
      .base
      .join("bible_chapters")
      .map_err(|e| eyre!("Invalid remote url: {}", e))?;

    let docs = self
      .get(url)
      .query(params)
      .send()
      .await
      .map_err(|e| eyre!("Chapter query failed: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Chapter query failed: {}", e))?
      .json::<Vec<ApiChapterDocument>>()
      .await
      .map_err(|e| eyre!("Failed to parse query result: {}", e))?;

    Ok(docs)
  }

  /// Upload chapter documents in batches, normalizing ids at write time
  /// so future reads hit the first candidate id.
  pub async fn bulk_save(&self, docs: Vec<ApiChapterDocument>) -> Result<usize> {
    let url = self
      .base
      .join("bible_chapters/batch")
      .map_err(|e| eyre!("Invalid remote url: {}", e))?;

    let total = docs.len();
    let now = chrono::Utc::now().to_rfc3339();

    let entries: Vec<ApiBatchEntry> = docs
      .into_iter()
      .map(|mut doc| {
        let language = doc.language.parse::<Language>()?;

        let version = doc
          .version
          .as_deref()
          .unwrap_or_else(|| language.default_version())
          .trim()
          .to_lowercase();

        let key = ChapterKey::new(language, doc.book.trim(), doc.chapter, version.clone());

        doc.language = language.as_str().to_string();
        doc.version = Some(version);
        doc.updated_at = Some(now.clone());

        Ok(ApiBatchEntry {
          id: ids::canonical_id(&key),
          document: doc,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    for (i, batch) in entries.chunks(BATCH_SIZE).enumerate() {
      if i > 0 {
        tokio::time::sleep(BATCH_PAUSE).await;
      }

      let mut req = self.http.post(url.clone()).json(&batch);
      if let Some(token) = &self.token {
        req = req.bearer_auth(token);
      }

      req
        .send()
        .await
        .map_err(|e| eyre!("Batch upload failed: {}", e))?
        .error_for_status()
        .map_err(|e| eyre!("Batch upload failed: {}", e))?;

      debug!("uploaded batch {} ({} documents)", i + 1, batch.len());
    }

    Ok(total)
  }
}

impl RemoteSource for RemoteClient {
  async fn fetch_chapter(&self, key: &ChapterKey) -> Result<Option<ChapterContent>> {
    // Direct id probes; a failed probe only skips that id
    for id in ids::candidate_ids(key) {
      match self.get_document(&id).await {
        Ok(Some(doc)) => {
          debug!("direct id hit: {}", id);
          return Ok(Some(doc.into_content()));
        }
        Ok(None) => {}
        Err(e) => debug!("probe {} failed: {}", id, e),
      }
    }

    // Fallback: filtered query, tolerant of id naming drift
    let mut params: Vec<(&str, String)> = vec![("chapter", key.chapter.to_string())];
    for spelling in canon::spellings(&key.book) {
      params.push(("book", spelling.to_string()));
    }

    let docs = self.query(&params).await?;

    let lang = key.language.as_str();
    let version = key.version.trim().to_lowercase();
    let mut matches = docs.into_iter().filter(|doc| {
      if !doc.language.eq_ignore_ascii_case(lang) {
        return false;
      }
      match key.language {
        Language::English => doc
          .version
          .as_deref()
          .unwrap_or("")
          .eq_ignore_ascii_case(&version),
        // Only one translation is tracked per non-english language
        _ => true,
      }
    });

    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
      warn!("multiple documents match {}; taking the first", key);
    }

    Ok(first.map(ApiChapterDocument::into_content))
  }

  async fn fetch_book_chapters(
    &self,
    language: Language,
    book: &str,
    version: &str,
  ) -> Result<Vec<(u32, ChapterContent)>> {
    let mut params: Vec<(&str, String)> = vec![("language", language.as_str().to_string())];
    for spelling in canon::spellings(book) {
      params.push(("book", spelling.to_string()));
    }
    if language == Language::English {
      params.push(("version", version.trim().to_lowercase()));
    }

    let docs = self.query(&params).await?;

    Ok(
      docs
        .into_iter()
        .map(|doc| (doc.chapter, doc.into_content()))
        .collect(),
    )
  }
}

//! Tiered chapter resolution: local cache, then the remote collection
//! under a timeout, then packaged static files.
//!
//! Every tier failure degrades to the next tier; a total miss is a
//! normal result, not an error. Each tier is attempted exactly once per
//! call - no retries, no circuit breaking.

use color_eyre::Result;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::ChapterStore;
use crate::canon;
use crate::fallback::StaticSource;
use crate::remote::RemoteSource;
use crate::types::{ChapterKey, Language, ResolvedChapter};

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_millis(2500);

/// Resolves chapters through the three content tiers in order.
///
/// All collaborators are injected at construction; the resolver owns no
/// connection state of its own.
pub struct Resolver<S, R, F> {
  store: S,
  remote: R,
  statics: F,
  remote_timeout: Duration,
}

impl<S: ChapterStore, R: RemoteSource, F: StaticSource> Resolver<S, R, F> {
  pub fn new(store: S, remote: R, statics: F) -> Self {
    Self {
      store,
      remote,
      statics,
      remote_timeout: DEFAULT_REMOTE_TIMEOUT,
    }
  }

  /// Set how long the remote tier may run before falling through.
  pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
    self.remote_timeout = remote_timeout;
    self
  }

  /// Resolve a chapter, tagging the result with the tier that served it.
  pub async fn resolve(&self, key: &ChapterKey) -> ResolvedChapter {
    let key = key.normalized();

    // 1. Local cache, exact key match. A storage error is a miss.
    match self.store.get(&key) {
      Ok(Some(content)) => {
        debug!("cache hit for {}", key);
        return ResolvedChapter::local(content);
      }
      Ok(None) => {}
      Err(e) => warn!("cache read failed for {}: {}", key, e),
    }

    // 2. Remote collection, bounded by a timeout. Dropping the timed-out
    // future aborts the in-flight request, so no late result exists.
    match timeout(self.remote_timeout, self.remote.fetch_chapter(&key)).await {
      Ok(Ok(Some(content))) => {
        // Write-through is best effort
        if let Err(e) = self.store.put(&key, &content) {
          warn!("cache write failed for {}: {}", key, e);
        }
        return ResolvedChapter::cloud(content);
      }
      Ok(Ok(None)) => {}
      Ok(Err(e)) => warn!("remote fetch failed for {}: {}", key, e),
      Err(_) => warn!("remote fetch timed out for {}, falling back", key),
    }

    // 3. Static files, only for the language's canonical translation so
    // a wrong-translation chapter is never served silently
    if key.language.is_default_version(&key.version) {
      if let Some(content) = self.statics.fetch(&key).await {
        return ResolvedChapter::from_static(content);
      }
    }

    ResolvedChapter::none()
  }

  /// Materialize every chapter of every canonical book for a
  /// (language, version) pair into the local cache.
  ///
  /// Books are fetched one at a time to bound load on the remote source
  /// and keep progress reporting deterministic. A failed book counts as
  /// zero chapters and the download continues.
  pub async fn materialize(
    &self,
    language: Language,
    version: &str,
    mut on_progress: impl FnMut(u8, &str),
  ) -> Result<()> {
    let version = version.trim();
    let total = canon::BOOKS.len();

    for (processed, book) in canon::BOOKS.iter().enumerate() {
      let percent = (processed * 100 / total) as u8;
      on_progress(percent, &format!("Downloading {}...", book.name));

      let chapters = match self
        .remote
        .fetch_book_chapters(language, book.name, version)
        .await
      {
        Ok(chapters) => chapters,
        Err(e) => {
          warn!("skipping {}: {}", book.name, e);
          Vec::new()
        }
      };

      for (chapter, content) in chapters {
        let key = ChapterKey::new(language, book.name, chapter, version);
        if let Err(e) = self.store.put(&key, &content) {
          warn!("cache write failed for {}: {}", key, e);
        }
      }
    }

    self.store.mark_downloaded(language, version)?;
    on_progress(100, "Download Complete");

    Ok(())
  }

  /// Whether the (language, version) pair is fully cached locally.
  pub fn is_downloaded(&self, language: Language, version: &str) -> Result<bool> {
    self.store.is_downloaded(language, version.trim())
  }
}

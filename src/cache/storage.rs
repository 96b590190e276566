//! Chapter store trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::types::{ChapterContent, ChapterKey, Language};

/// Trait for chapter cache backends.
pub trait ChapterStore: Send + Sync {
  /// Look up a chapter by exact key.
  fn get(&self, key: &ChapterKey) -> Result<Option<ChapterContent>>;

  /// Store a chapter, replacing any previous content under the key.
  fn put(&self, key: &ChapterKey, content: &ChapterContent) -> Result<()>;

  /// Record that a (language, version) pair has been fully materialized.
  fn mark_downloaded(&self, language: Language, version: &str) -> Result<()>;

  /// Whether a (language, version) pair has been fully materialized.
  fn is_downloaded(&self, language: Language, version: &str) -> Result<bool>;

  /// All (language, version) pairs marked as downloaded.
  fn list_downloaded(&self) -> Result<Vec<(String, String)>>;

  /// Drop all cached chapters and download markers.
  fn clear(&self) -> Result<()>;
}

impl<T: ChapterStore + ?Sized> ChapterStore for Box<T> {
  fn get(&self, key: &ChapterKey) -> Result<Option<ChapterContent>> {
    (**self).get(key)
  }

  fn put(&self, key: &ChapterKey, content: &ChapterContent) -> Result<()> {
    (**self).put(key, content)
  }

  fn mark_downloaded(&self, language: Language, version: &str) -> Result<()> {
    (**self).mark_downloaded(language, version)
  }

  fn is_downloaded(&self, language: Language, version: &str) -> Result<bool> {
    (**self).is_downloaded(language, version)
  }

  fn list_downloaded(&self) -> Result<Vec<(String, String)>> {
    (**self).list_downloaded()
  }

  fn clear(&self) -> Result<()> {
    (**self).clear()
  }
}

/// Store implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStore;

impl ChapterStore for NoopStore {
  fn get(&self, _key: &ChapterKey) -> Result<Option<ChapterContent>> {
    Ok(None) // Always miss
  }

  fn put(&self, _key: &ChapterKey, _content: &ChapterContent) -> Result<()> {
    Ok(()) // Discard
  }

  fn mark_downloaded(&self, _language: Language, _version: &str) -> Result<()> {
    Ok(()) // Discard
  }

  fn is_downloaded(&self, _language: Language, _version: &str) -> Result<bool> {
    Ok(false)
  }

  fn list_downloaded(&self) -> Result<Vec<(String, String)>> {
    Ok(Vec::new())
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based chapter store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path)
  }

  /// Open or create the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Open an in-memory store. Used in tests and throwaway runs.
  #[allow(dead_code)]
  pub fn in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("versecache").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Chapter content keyed by the full translation coordinate.
-- Version is stored as written (trimmed, case preserved).
CREATE TABLE IF NOT EXISTS chapters (
    language TEXT NOT NULL,
    version TEXT NOT NULL,
    book TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verses BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (language, version, book, chapter)
);

-- Fully-downloaded translation markers
CREATE TABLE IF NOT EXISTS downloads (
    language TEXT NOT NULL,
    version TEXT NOT NULL,
    downloaded_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (language, version)
);
"#;

impl ChapterStore for SqliteStore {
  fn get(&self, key: &ChapterKey) -> Result<Option<ChapterContent>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT verses FROM chapters
         WHERE language = ? AND version = ? AND book = ? AND chapter = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let result: Option<Vec<u8>> = stmt
      .query_row(
        params![key.language.as_str(), key.version, key.book, key.chapter],
        |row| row.get(0),
      )
      .ok();

    match result {
      Some(data) => {
        let content: ChapterContent = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize chapter: {}", e))?;
        Ok(Some(content))
      }
      None => Ok(None),
    }
  }

  fn put(&self, key: &ChapterKey, content: &ChapterContent) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data =
      serde_json::to_vec(content).map_err(|e| eyre!("Failed to serialize chapter: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO chapters (language, version, book, chapter, verses, cached_at)
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
        params![key.language.as_str(), key.version, key.book, key.chapter, data],
      )
      .map_err(|e| eyre!("Failed to store chapter: {}", e))?;

    Ok(())
  }

  fn mark_downloaded(&self, language: Language, version: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO downloads (language, version, downloaded_at)
         VALUES (?, ?, datetime('now'))",
        params![language.as_str(), version],
      )
      .map_err(|e| eyre!("Failed to mark download: {}", e))?;

    Ok(())
  }

  fn is_downloaded(&self, language: Language, version: &str) -> Result<bool> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT 1 FROM downloads WHERE language = ? AND version = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let found: Option<i64> = stmt
      .query_row(params![language.as_str(), version], |row| row.get(0))
      .ok();

    Ok(found.is_some())
  }

  fn list_downloaded(&self) -> Result<Vec<(String, String)>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT language, version FROM downloads ORDER BY language, version")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let pairs: Vec<(String, String)> = stmt
      .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
      .map_err(|e| eyre!("Failed to query downloads: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(pairs)
  }

  fn clear(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch("DELETE FROM chapters; DELETE FROM downloads;")
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_key() -> ChapterKey {
    ChapterKey::new(Language::English, "John", 3, "KJV")
  }

  fn sample_content() -> ChapterContent {
    let mut verses = ChapterContent::new();
    verses.insert(16, "For God so loved the world...".to_string());
    verses.insert(17, "For God sent not his Son...".to_string());
    verses
  }

  #[test]
  fn test_put_then_get_roundtrip() {
    let store = SqliteStore::in_memory().unwrap();
    let key = sample_key();
    let content = sample_content();

    store.put(&key, &content).unwrap();
    let fetched = store.get(&key).unwrap().unwrap();

    assert_eq!(fetched, content);
  }

  #[test]
  fn test_get_miss_returns_none() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(store.get(&sample_key()).unwrap().is_none());
  }

  #[test]
  fn test_put_replaces_wholesale() {
    let store = SqliteStore::in_memory().unwrap();
    let key = sample_key();

    store.put(&key, &sample_content()).unwrap();

    let mut replacement = ChapterContent::new();
    replacement.insert(1, "In the beginning was the Word".to_string());
    store.put(&key, &replacement).unwrap();

    let fetched = store.get(&key).unwrap().unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(
      fetched.get(&1).map(String::as_str),
      Some("In the beginning was the Word")
    );
  }

  #[test]
  fn test_version_case_is_part_of_key() {
    let store = SqliteStore::in_memory().unwrap();
    let upper = ChapterKey::new(Language::English, "John", 3, "KJV");
    let lower = ChapterKey::new(Language::English, "John", 3, "kjv");

    store.put(&upper, &sample_content()).unwrap();

    assert!(store.get(&upper).unwrap().is_some());
    assert!(store.get(&lower).unwrap().is_none());
  }

  #[test]
  fn test_download_markers() {
    let store = SqliteStore::in_memory().unwrap();

    assert!(!store.is_downloaded(Language::Telugu, "BSI").unwrap());

    store.mark_downloaded(Language::Telugu, "BSI").unwrap();

    assert!(store.is_downloaded(Language::Telugu, "BSI").unwrap());
    assert!(!store.is_downloaded(Language::English, "KJV").unwrap());
    assert_eq!(
      store.list_downloaded().unwrap(),
      vec![("telugu".to_string(), "BSI".to_string())]
    );
  }

  #[test]
  fn test_clear_drops_chapters_and_markers() {
    let store = SqliteStore::in_memory().unwrap();
    let key = sample_key();

    store.put(&key, &sample_content()).unwrap();
    store.mark_downloaded(Language::English, "KJV").unwrap();

    store.clear().unwrap();

    assert!(store.get(&key).unwrap().is_none());
    assert!(!store.is_downloaded(Language::English, "KJV").unwrap());
  }

  #[test]
  fn test_noop_store_never_hits() {
    let store = NoopStore;
    let key = sample_key();

    store.put(&key, &sample_content()).unwrap();
    assert!(store.get(&key).unwrap().is_none());

    store.mark_downloaded(Language::English, "KJV").unwrap();
    assert!(!store.is_downloaded(Language::English, "KJV").unwrap());
  }
}

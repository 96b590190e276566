//! Remote chapter collection access.
//!
//! Documents live in a `bible_chapters` collection addressed either by a
//! constructed id (fast path) or by field filters (tolerates naming drift
//! in historical data).

pub mod api_types;
pub mod ids;
mod client;

pub use client::RemoteClient;

use color_eyre::Result;

use crate::types::{ChapterContent, ChapterKey, Language};

/// Trait over the remote tier, kept narrow so the resolver can be
/// exercised against stubs.
pub trait RemoteSource {
  /// Fetch one chapter. Ok(None) means the collection has no match,
  /// which is a normal outcome.
  async fn fetch_chapter(&self, key: &ChapterKey) -> Result<Option<ChapterContent>>;

  /// Fetch every chapter of one book in a single query, for bulk
  /// materialization.
  async fn fetch_book_chapters(
    &self,
    language: Language,
    book: &str,
    version: &str,
  ) -> Result<Vec<(u32, ChapterContent)>>;
}

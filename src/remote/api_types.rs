//! Serde types matching the bible_chapters collection wire format.
//!
//! These types are separate from domain types to allow clean
//! deserialization; verse objects arrive keyed by stringified verse
//! number and are converted leniently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{parse_verse_map, ChapterContent};

/// One document in the bible_chapters collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiChapterDocument {
  #[serde(default)]
  pub language: String,
  pub version: Option<String>,
  #[serde(default)]
  pub book: String,
  #[serde(default)]
  pub chapter: u32,
  #[serde(default)]
  pub verses: BTreeMap<String, String>,
  #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>,
}

impl ApiChapterDocument {
  pub fn into_content(self) -> ChapterContent {
    parse_verse_map(self.verses)
  }
}

/// One entry in a batch write request: the target document id plus the
/// document body
#[derive(Debug, Serialize)]
pub struct ApiBatchEntry {
  pub id: String,
  #[serde(flatten)]
  pub document: ApiChapterDocument,
}

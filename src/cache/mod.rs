//! Local chapter cache for offline reading.
//!
//! Chapters are stored keyed by (language, version, book, chapter) and
//! persist until an explicit clear - content is canonical text, so there
//! is no invalidation or eviction. A separate marker table records which
//! (language, version) pairs have been fully materialized.

mod storage;

pub use storage::{ChapterStore, NoopStore, SqliteStore};

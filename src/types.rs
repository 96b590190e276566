use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Verse number to verse text. Gaps are allowed; a chapter is replaced
/// wholesale and never patched verse-by-verse.
pub type ChapterContent = BTreeMap<u32, String>;

/// Convert a wire verse object (string keys) into chapter content,
/// skipping keys that are not verse numbers.
pub fn parse_verse_map(verses: BTreeMap<String, String>) -> ChapterContent {
  verses
    .into_iter()
    .filter_map(|(k, v)| k.trim().parse::<u32>().ok().map(|n| (n, v)))
    .collect()
}

/// Languages with chapter content in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  English,
  Telugu,
  Tamil,
  Hindi,
  Arabic,
  Kannada,
  Malayalam,
  Marathi,
  Punjabi,
}

impl Language {
  /// Lowercase form used in document ids, cache keys and static file paths
  pub fn as_str(&self) -> &'static str {
    match self {
      Language::English => "english",
      Language::Telugu => "telugu",
      Language::Tamil => "tamil",
      Language::Hindi => "hindi",
      Language::Arabic => "arabic",
      Language::Kannada => "kannada",
      Language::Malayalam => "malayalam",
      Language::Marathi => "marathi",
      Language::Punjabi => "punjabi",
    }
  }

  /// The translation treated as canonical for this language.
  /// Only english tracks multiple versions.
  pub fn default_version(&self) -> &'static str {
    match self {
      Language::English => "KJV",
      _ => "BSI",
    }
  }

  /// Whether the static fallback may serve the requested version.
  /// Non-english languages track a single canonical translation, so any
  /// requested version maps to it.
  pub fn is_default_version(&self, version: &str) -> bool {
    match self {
      Language::English => version.eq_ignore_ascii_case("KJV"),
      _ => true,
    }
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Language {
  type Err = color_eyre::Report;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "english" => Ok(Language::English),
      "telugu" => Ok(Language::Telugu),
      "tamil" => Ok(Language::Tamil),
      "hindi" => Ok(Language::Hindi),
      "arabic" => Ok(Language::Arabic),
      "kannada" => Ok(Language::Kannada),
      "malayalam" => Ok(Language::Malayalam),
      "marathi" => Ok(Language::Marathi),
      "punjabi" => Ok(Language::Punjabi),
      other => Err(color_eyre::eyre::eyre!("Unknown language: {}", other)),
    }
  }
}

/// Composite key identifying one chapter of one translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterKey {
  pub language: Language,
  pub version: String,
  pub book: String,
  pub chapter: u32,
}

impl ChapterKey {
  pub fn new(
    language: Language,
    book: impl Into<String>,
    chapter: u32,
    version: impl Into<String>,
  ) -> Self {
    Self {
      language,
      version: version.into(),
      book: book.into(),
      chapter,
    }
  }

  /// Copy of the key with book and version trimmed. Version case is
  /// preserved: cache keys distinguish "KJV" as written, while document
  /// ids lowercase it separately.
  pub fn normalized(&self) -> Self {
    Self {
      language: self.language,
      version: self.version.trim().to_string(),
      book: self.book.trim().to_string(),
      chapter: self.chapter,
    }
  }
}

impl fmt::Display for ChapterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} ({}/{})",
      self.book, self.chapter, self.language, self.version
    )
  }
}

/// Which tier satisfied a resolve call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  /// Local cache hit
  Local,
  /// Fetched from the remote collection
  Cloud,
  /// Served from packaged static files
  Static,
  /// No tier had the chapter
  None,
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Source::Local => "local",
      Source::Cloud => "cloud",
      Source::Static => "static",
      Source::None => "none",
    };
    f.write_str(s)
  }
}

/// Result of a resolve call: the content, if any tier had it, and the
/// tier that served it
#[derive(Debug, Clone)]
pub struct ResolvedChapter {
  pub content: Option<ChapterContent>,
  pub source: Source,
}

impl ResolvedChapter {
  pub fn local(content: ChapterContent) -> Self {
    Self {
      content: Some(content),
      source: Source::Local,
    }
  }

  pub fn cloud(content: ChapterContent) -> Self {
    Self {
      content: Some(content),
      source: Source::Cloud,
    }
  }

  pub fn from_static(content: ChapterContent) -> Self {
    Self {
      content: Some(content),
      source: Source::Static,
    }
  }

  pub fn none() -> Self {
    Self {
      content: None,
      source: Source::None,
    }
  }
}

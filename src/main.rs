mod cache;
mod canon;
mod config;
mod fallback;
mod remote;
mod resolver;
mod types;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cache::{ChapterStore, NoopStore, SqliteStore};
use config::Config;
use fallback::HttpStaticSource;
use remote::api_types::ApiChapterDocument;
use remote::RemoteClient;
use resolver::Resolver;
use types::{ChapterKey, Language};

#[derive(Parser, Debug)]
#[command(name = "versecache")]
#[command(about = "Offline-first Bible chapter fetcher with a tiered cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/versecache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Skip the local cache entirely (no reads, no writes)
  #[arg(long)]
  no_cache: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolve and print one chapter
  Read {
    /// Book display name, e.g. "John" or "Song of Solomon"
    book: String,
    /// Chapter number
    chapter: u32,
    #[arg(short, long, value_enum, default_value_t = Language::English)]
    language: Language,
    /// Translation; defaults to the language's canonical version
    #[arg(short, long)]
    version: Option<String>,
  },
  /// Download a full translation into the local cache for offline use
  Download {
    #[arg(short, long, value_enum, default_value_t = Language::English)]
    language: Language,
    /// Translation; defaults to the language's canonical version
    #[arg(short, long)]
    version: Option<String>,
  },
  /// List the canonical books with their chapter counts
  Books,
  /// List fully downloaded translations
  Status,
  /// Purge the local cache
  Clear,
  /// Upload chapter documents from a JSON file to the remote collection
  Ingest {
    /// File containing a JSON array of chapter documents
    file: PathBuf,
  },
}

fn build_resolver(
  store: Box<dyn ChapterStore>,
  config: &Config,
) -> Result<Resolver<Box<dyn ChapterStore>, RemoteClient, HttpStaticSource>> {
  let client = RemoteClient::new(config)?;
  let statics = HttpStaticSource::new(config)?;

  Ok(
    Resolver::new(store, client, statics)
      .with_remote_timeout(Duration::from_millis(config.remote.timeout_ms)),
  )
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Logs go to stderr so stdout stays clean for chapter output
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Listing books needs no configuration
  if matches!(args.command, Command::Books) {
    let mut current_group = "";
    for book in canon::BOOKS {
      if book.group != current_group {
        println!("{}:", book.group);
        current_group = book.group;
      }
      println!("  {} ({} chapters)", book.name, book.chapters);
    }
    return Ok(());
  }

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let store: Box<dyn ChapterStore> = if args.no_cache {
    Box::new(NoopStore)
  } else {
    match &config.cache.path {
      Some(path) => Box::new(SqliteStore::open_at(path)?),
      None => Box::new(SqliteStore::open()?),
    }
  };

  match args.command {
    Command::Read {
      book,
      chapter,
      language,
      version,
    } => {
      canon::validate_reference(&book, chapter)?;

      let version = version.unwrap_or_else(|| language.default_version().to_string());
      let key = ChapterKey::new(language, book.trim(), chapter, version);

      let resolver = build_resolver(store, &config)?;
      let result = resolver.resolve(&key).await;

      match result.content {
        Some(content) => {
          println!("{} [{}]", key, result.source);
          for (number, text) in &content {
            println!("{:>3}  {}", number, text);
          }
        }
        None => {
          println!(
            "{} is not available from any source. Try again once online.",
            key
          );
        }
      }
    }

    Command::Download { language, version } => {
      let version = version.unwrap_or_else(|| language.default_version().to_string());

      let resolver = build_resolver(store, &config)?;
      if resolver.is_downloaded(language, &version)? {
        println!("{} {} is already downloaded; refreshing.", language, version);
      }

      resolver
        .materialize(language, &version, |percent, message| {
          println!("[{:>3}%] {}", percent, message);
        })
        .await?;

      println!("{} {} is now available offline.", language, version);
    }

    Command::Status => {
      let downloads = store.list_downloaded()?;
      if downloads.is_empty() {
        println!("No translations downloaded.");
      } else {
        for (language, version) in downloads {
          println!("{} {}", language, version);
        }
      }
    }

    Command::Clear => {
      store.clear()?;
      println!("Local cache cleared.");
    }

    // Handled before configuration is loaded
    Command::Books => unreachable!(),

    Command::Ingest { file } => {
      let contents = std::fs::read_to_string(&file)
        .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
      let docs: Vec<ApiChapterDocument> = serde_json::from_str(&contents)
        .map_err(|e| eyre!("Failed to parse {}: {}", file.display(), e))?;

      let client = RemoteClient::new(&config)?;
      let count = client.bulk_save(docs).await?;
      println!("Uploaded {} chapters.", count);
    }
  }

  Ok(())
}

//! `flix`: load, query and maintain a movie catalog in a SQLite file.
//!
//! # Usage
//!
//! ```text
//! flix load movies.csv
//! flix query --search Affleck --country "United Kingdom" --genre Drama
//! flix read 10192 --json
//! flix --store /tmp/catalog.db delete 10192
//! ```
//!
//! Settings come from an optional TOML file (`--config`, default
//! `flix.toml`), then `FLIX_*` environment variables, then flags.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use flix_store_sqlite::SqliteRepository;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "flix", version, about = "Movie catalog on SQLite")]
struct Cli {
  /// Path to a TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "flix.toml")]
  config: PathBuf,

  /// Catalog database file; overrides `store_path` from the config.
  #[arg(short, long, value_name = "PATH")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load every record of a catalog CSV. Duplicate ids are skipped.
  Load {
    csv: PathBuf,
  },
  /// List movies matching the given filters, ordered by title.
  Query(QueryArgs),
  /// Show one movie.
  Read {
    id:   i64,
    #[arg(long)]
    json: bool,
  },
  /// Remove one movie. Removing an unknown id is not an error.
  Delete {
    id: i64,
  },
}

#[derive(Args, Debug, Default)]
struct QueryArgs {
  /// Substring of a director or actor name (case-sensitive).
  #[arg(long)]
  search:       Option<String>,
  #[arg(long)]
  genre:        Option<String>,
  #[arg(long)]
  country:      Option<String>,
  /// Only movies added strictly after this date (YYYY-MM-DD).
  #[arg(long, value_name = "DATE")]
  added_after:  Option<chrono::NaiveDate>,
  /// Only movies added strictly before this date (YYYY-MM-DD).
  #[arg(long, value_name = "DATE")]
  added_before: Option<chrono::NaiveDate>,
  #[arg(long)]
  min_rating:   Option<f64>,
  #[arg(long)]
  max_rating:   Option<f64>,
  #[arg(long)]
  limit:        Option<usize>,
  /// Print JSON instead of one line per movie.
  #[arg(long)]
  json:         bool,
}

impl QueryArgs {
  fn to_query(&self) -> flix_core::Query {
    flix_core::Query {
      search:       self.search.clone(),
      genre:        self.genre.clone(),
      country:      self.country.clone(),
      added_after:  self.added_after,
      added_before: self.added_before,
      min_rating:   self.min_rating,
      max_rating:   self.max_rating,
      limit:        self.limit,
    }
  }
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings read from the config file and `FLIX_*` environment variables.
#[derive(Deserialize, Debug)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  /// `tracing` filter directives, e.g. `"flix_store_sqlite=debug"`.
  #[serde(default)]
  log_filter: Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("flix.db") }

fn load_settings(path: PathBuf) -> Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("FLIX"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

fn init_tracing(filter: Option<&str>) {
  let builder =
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
  let filter = match filter {
    Some(directives) => builder.parse_lossy(directives),
    None => builder.from_env_lossy(),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let settings = load_settings(cli.config)?;
  init_tracing(settings.log_filter.as_deref());

  let store_path = cli.store.unwrap_or(settings.store_path);
  let repo = SqliteRepository::open(&store_path)
    .await
    .with_context(|| format!("failed to open catalog at {store_path:?}"))?;

  // Ctrl-C cancels whatever operation is in flight.
  let cancel = CancellationToken::new();
  {
    let cancel = cancel.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupted, cancelling");
        cancel.cancel();
      }
    });
  }

  match cli.command {
    Command::Load { csv } => {
      let summary = commands::load_file(&repo, &csv, &cancel).await?;
      tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        "catalog loaded from {}",
        csv.display()
      );
    }
    Command::Query(args) => {
      let movies = commands::query(&repo, &args.to_query(), &cancel).await?;
      output::print_movies(&movies, args.json)?;
    }
    Command::Read { id, json } => {
      let movie = commands::read(&repo, id, &cancel).await?;
      output::print_movies(std::slice::from_ref(&movie), json)?;
    }
    Command::Delete { id } => {
      commands::delete(&repo, id, &cancel).await?;
      tracing::info!(movie_id = id, "deleted");
    }
  }

  Ok(())
}

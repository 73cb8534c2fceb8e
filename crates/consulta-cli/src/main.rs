//! `consulta`: lookup tool over the in-memory entity store.
//!
//! # Usage
//!
//! ```text
//! consulta search cpf 123.456.789-01
//! consulta --format json search nome santos
//! consulta show cnpj 12.345.678/0001-99
//! consulta --latency-ms 0 repl
//! ```

mod config;
mod render;
mod repl;
mod session;

use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use consulta_core::{
  kind::SearchKind,
  projection::project_batch,
  store::{EntityStore, Query},
};
use consulta_store_memory::MemoryStore;
use session::Session;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{OutputFormat, Overrides};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "consulta", version, about = "Look up people and companies")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "consulta.toml")]
  config: PathBuf,

  /// Emulated round-trip delay per store read.
  #[arg(long, value_name = "MS")]
  latency_ms: Option<u64>,

  /// Output format.
  #[arg(long, value_enum)]
  format: Option<OutputFormat>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run one search and print the result list.
  Search {
    /// cpf, cnpj, email, telefone, endereco or nome.
    #[arg(value_parser = parse_kind)]
    kind: SearchKind,
    /// Search term; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    term: Vec<String>,
  },
  /// Print the full record for a CPF or CNPJ.
  Show {
    #[arg(value_parser = parse_kind)]
    kind:     SearchKind,
    document: String,
  },
  /// Print every entity in the store.
  List,
  /// Interactive session on stdin.
  Repl,
}

fn parse_kind(raw: &str) -> Result<SearchKind, String> {
  SearchKind::parse(raw).map_err(|e| e.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let settings = config::load(&cli.config, &Overrides {
    latency_ms: cli.latency_ms,
    format:     cli.format,
  })?;
  tracing::debug!(?settings, "loaded settings");

  let store = Arc::new(
    MemoryStore::seeded()
      .context("failed to load the seed dataset")?
      .with_latency(settings.latency()),
  );
  let format = settings.format;
  let mut stdout = std::io::stdout().lock();

  match cli.command {
    Command::Search { kind, term } => {
      let query = Query::new(kind, &term.join(" "))?;
      let mut session = Session::new(store, settings.recent_capacity);
      session.submit(query).await;
      write!(stdout, "{}", render::rows(format, &session.visible_rows())?)?;
    }
    Command::Show { kind, document } => {
      let entity_kind = kind
        .entity_kind()
        .ok_or_else(|| anyhow!("`show` takes cpf or cnpj, not {kind}"))?;
      let document = kind.prepare(&document)?;
      let entity = store
        .get(entity_kind, &document, &CancellationToken::new())
        .await?
        .with_context(|| format!("no {} registered as {document}", kind.label()))?;
      write!(stdout, "{}", render::detail(format, &entity)?)?;
    }
    Command::List => {
      let entities = store.all().await?;
      let batch = project_batch(&entities);
      let rows: Vec<_> = batch.iter().collect();
      write!(stdout, "{}", render::rows(format, &rows)?)?;
    }
    Command::Repl => {
      let mut session = Session::new(store, settings.recent_capacity);
      let input = BufReader::new(tokio::io::stdin());
      repl::run(&mut session, format, input, &mut stdout).await?;
    }
  }

  Ok(())
}

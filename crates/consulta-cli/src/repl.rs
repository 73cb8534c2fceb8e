//! Line-oriented interactive session.

use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use consulta_core::{
  entity::EntityKind,
  kind::SearchKind,
  store::{EntityStore, Query},
};
use tokio::{
  io::{AsyncBufRead, AsyncBufReadExt},
  task::{JoinError, JoinHandle},
};
use tracing::debug;

use crate::{
  config::OutputFormat,
  render,
  session::{QueryOutcome, Session, View},
};

const HELP: &str = "\
Commands:
  search <kind> <term>   kinds: cpf, cnpj, email, telefone, endereco, nome
  details <row>          open the detail view for a result row
  close                  close the detail view
  back                   return to the search form
  filter <pf|pj> <on|off>
  recent                 previously viewed entities
  status                 current view, query and filter
  help
  quit
";

// ─── Commands ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Search { kind: SearchKind, term: String },
  Details(usize),
  Close,
  Back,
  Filter { kind: EntityKind, visible: bool },
  Recent,
  Status,
  Help,
  Quit,
}

impl Command {
  /// Parse one input line. Blank lines yield `None`.
  pub fn parse(line: &str) -> Result<Option<Self>> {
    let line = line.trim();
    let (word, rest) = line
      .split_once(char::is_whitespace)
      .map(|(w, r)| (w, r.trim()))
      .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
      "" => return Ok(None),
      "search" | "s" => {
        let (kind, term) = rest
          .split_once(char::is_whitespace)
          .ok_or_else(|| anyhow!("usage: search <kind> <term>"))?;
        Self::Search {
          kind: SearchKind::parse(kind)?,
          term: term.trim().to_owned(),
        }
      }
      "details" | "d" => Self::Details(
        rest
          .parse()
          .with_context(|| format!("not a row number: {rest:?}"))?,
      ),
      "close" => Self::Close,
      "back" | "b" => Self::Back,
      "filter" => {
        let mut args = rest.split_whitespace();
        let kind = match args.next().map(str::to_ascii_lowercase).as_deref() {
          Some("pf") => EntityKind::Individual,
          Some("pj") => EntityKind::Organization,
          _ => bail!("usage: filter <pf|pj> <on|off>"),
        };
        let visible = match args.next().map(str::to_ascii_lowercase).as_deref() {
          Some("on") => true,
          Some("off") => false,
          _ => bail!("usage: filter <pf|pj> <on|off>"),
        };
        Self::Filter { kind, visible }
      }
      "recent" | "r" => Self::Recent,
      "status" => Self::Status,
      "help" | "?" => Self::Help,
      "quit" | "exit" | "q" => Self::Quit,
      other => bail!("unknown command {other:?}; type `help`"),
    };
    Ok(Some(command))
  }

  /// Whether the command acts on the result batch, and so must see the
  /// search in flight applied first.
  fn reads_results(&self) -> bool {
    matches!(self, Self::Details(_) | Self::Filter { .. })
  }
}

// ─── Loop ─────────────────────────────────────────────────────────────────────

type Pending<E> = Option<JoinHandle<QueryOutcome<E>>>;

/// Read commands from `input` until it ends or `quit` is entered.
///
/// A search runs on its own task while the loop keeps reading. Starting
/// another search or going `back` supersedes it. `details` and `filter` wait
/// for the search in flight before they act on the results. At end of input
/// the last search is allowed to finish.
///
/// Command errors are reported on `out` and the loop carries on; only I/O
/// failures end it early.
pub async fn run<S, R, W>(
  session: &mut Session<S>,
  format: OutputFormat,
  input: R,
  out: &mut W,
) -> Result<()>
where
  S: EntityStore + 'static,
  R: AsyncBufRead + Unpin,
  W: Write,
{
  let mut lines = input.lines();
  let mut pending: Pending<S::Error> = None;
  prompt(out)?;

  loop {
    tokio::select! {
      joined = outcome(&mut pending) => {
        pending = None;
        settle(session, format, joined, out)?;
        prompt(out)?;
      }
      line = lines.next_line() => {
        let Some(line) = line.context("reading input")? else {
          if let Some(handle) = pending.take() {
            settle(session, format, handle.await, out)?;
          }
          break;
        };
        match Command::parse(&line) {
          Ok(Some(Command::Quit)) => break,
          Ok(Some(command)) => {
            if command.reads_results() {
              if let Some(handle) = pending.take() {
                settle(session, format, handle.await, out)?;
              }
            }
            if let Err(e) = execute(session, format, command, &mut pending, out).await {
              writeln!(out, "error: {e:#}")?;
            }
          }
          Ok(None) => {}
          Err(e) => writeln!(out, "error: {e:#}")?,
        }
        prompt(out)?;
      }
    }
  }
  writeln!(out)?;
  Ok(())
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
  write!(out, "> ")?;
  out.flush()?;
  Ok(())
}

/// The outcome of the search in flight; never resolves when there is none.
async fn outcome<T>(pending: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
  match pending {
    Some(handle) => handle.await,
    None => std::future::pending().await,
  }
}

/// Apply a finished search and print its rows, unless it was superseded.
fn settle<S, W>(
  session: &mut Session<S>,
  format: OutputFormat,
  joined: Result<QueryOutcome<S::Error>, JoinError>,
  out: &mut W,
) -> Result<()>
where
  S: EntityStore,
  W: Write,
{
  let outcome = joined.context("search task failed")?;
  if session.finish_query(outcome) {
    write!(out, "{}", render::rows(format, &session.visible_rows())?)?;
  }
  Ok(())
}

async fn execute<S, W>(
  session: &mut Session<S>,
  format: OutputFormat,
  command: Command,
  pending: &mut Pending<S::Error>,
  out: &mut W,
) -> Result<()>
where
  S: EntityStore + 'static,
  W: Write,
{
  match command {
    Command::Search { kind, term } => {
      let query = Query::new(kind, &term)?;
      let search = session.begin_query(query);
      debug!(
        generation = search.generation(),
        term = %search.query().term,
        "spawning search"
      );
      // The superseded task still runs to its cancellation; its outcome
      // carries a stale generation and is never applied.
      *pending = Some(tokio::spawn(search.run()));
    }
    Command::Details(row) => {
      let entity = session.open_details(row).await?;
      write!(out, "{}", render::detail(format, entity)?)?;
    }
    Command::Close => session.close_details(),
    Command::Back => {
      session.back();
      *pending = None;
    }
    Command::Filter { kind, visible } => {
      session.set_filter(kind, visible);
      write!(out, "{}", render::rows(format, &session.visible_rows())?)?;
    }
    Command::Recent => write!(out, "{}", render::recent(format, session.recent())?)?,
    Command::Status => write!(out, "{}", status(session))?,
    Command::Help => write!(out, "{HELP}")?,
    Command::Quit => {}
  }
  Ok(())
}

fn status<S: EntityStore>(session: &Session<S>) -> String {
  let view = match session.view() {
    View::Query => "busca",
    View::Results => "resultados",
  };
  let mut out = format!("view: {view}\n");
  if let Some(query) = session.last_query() {
    out += &format!("query: {} {}\n", query.kind.label(), query.term);
    out += &format!(
      "rows: {} ({} total)\n",
      session.count_label(),
      session.rows().len()
    );
  }
  let filter = session.filter();
  let flag = |on: bool| if on { "on" } else { "off" };
  out += &format!(
    "filter: pf {} / pj {}\n",
    flag(filter.individuals),
    flag(filter.organizations)
  );
  if let Some(entity) = session.detail() {
    out += &format!("detail: {}\n", entity.name());
  }
  if session.is_pending() {
    out += "a query is still running\n";
  }
  out
}

//! View-state controller: which view is showing, the current result batch,
//! the detail overlay, and the recency list.
//!
//! Overlapping queries are resolved latest-wins: starting a query cancels the
//! one in flight and bumps a generation counter, and a completion carrying a
//! stale generation is dropped.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use consulta_core::{
  entity::{Entity, EntityKind},
  projection::{ResultRow, count_label, project_batch},
  recency::RecencyList,
  store::{EntityStore, Query},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  /// The search form.
  Query,
  /// The result list; the detail overlay may be open on top of it.
  Results,
}

/// Which entity variants the result list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter {
  pub individuals:   bool,
  pub organizations: bool,
}

impl Default for KindFilter {
  fn default() -> Self {
    Self {
      individuals:   true,
      organizations: true,
    }
  }
}

impl KindFilter {
  pub fn shows(&self, kind: EntityKind) -> bool {
    match kind {
      EntityKind::Individual => self.individuals,
      EntityKind::Organization => self.organizations,
    }
  }

  pub fn set(&mut self, kind: EntityKind, visible: bool) {
    match kind {
      EntityKind::Individual => self.individuals = visible,
      EntityKind::Organization => self.organizations = visible,
    }
  }
}

// ─── Pending query ────────────────────────────────────────────────────────────

/// A query that has been started but not yet applied to the session.
///
/// Running it does not borrow the session, so it can be spawned on its own
/// task while the caller keeps handling input.
pub struct PendingQuery<S> {
  generation: u64,
  query:      Query,
  cancel:     CancellationToken,
  store:      Arc<S>,
}

impl<S: EntityStore> PendingQuery<S> {
  pub fn generation(&self) -> u64 { self.generation }

  pub fn query(&self) -> &Query { &self.query }

  /// Perform the search against the store.
  pub async fn run(self) -> QueryOutcome<S::Error> {
    let result = self.store.search(&self.query, &self.cancel).await;
    QueryOutcome {
      generation: self.generation,
      query: self.query,
      result,
    }
  }
}

/// The result of a [`PendingQuery`], to be handed back to
/// [`Session::finish_query`].
#[derive(Debug)]
pub struct QueryOutcome<E> {
  pub generation: u64,
  pub query:      Query,
  pub result:     Result<Vec<Entity>, E>,
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Top-level controller state.
pub struct Session<S> {
  store:      Arc<S>,
  view:       View,
  /// The query whose results are showing.
  last_query: Option<Query>,
  /// The current result batch, unfiltered.
  rows:       Vec<ResultRow>,
  filter:     KindFilter,
  /// The entity shown in the detail overlay.
  detail:     Option<Entity>,
  recent:     RecencyList,
  generation: u64,
  in_flight:  Option<CancellationToken>,
}

impl<S: EntityStore> Session<S> {
  pub fn new(store: Arc<S>, recent_capacity: usize) -> Self {
    Self {
      store,
      view: View::Query,
      last_query: None,
      rows: Vec::new(),
      filter: KindFilter::default(),
      detail: None,
      recent: RecencyList::new(recent_capacity),
      generation: 0,
      in_flight: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn view(&self) -> View { self.view }

  pub fn last_query(&self) -> Option<&Query> { self.last_query.as_ref() }

  pub fn rows(&self) -> &[ResultRow] { &self.rows }

  /// Rows that pass the kind filter.
  pub fn visible_rows(&self) -> Vec<&ResultRow> {
    self
      .rows
      .iter()
      .filter(|row| self.filter.shows(row.summary.kind))
      .collect()
  }

  /// e.g. `"2 resultados"`, counting only visible rows.
  pub fn count_label(&self) -> String { count_label(self.visible_rows().len()) }

  pub fn filter(&self) -> KindFilter { self.filter }

  pub fn set_filter(&mut self, kind: EntityKind, visible: bool) {
    self.filter.set(kind, visible);
  }

  pub fn detail(&self) -> Option<&Entity> { self.detail.as_ref() }

  pub fn recent(&self) -> &RecencyList { &self.recent }

  pub fn is_pending(&self) -> bool { self.in_flight.is_some() }

  // ── Query lifecycle ───────────────────────────────────────────────────────

  /// Start `query`, cancelling whatever was in flight.
  pub fn begin_query(&mut self, query: Query) -> PendingQuery<S> {
    self.cancel_in_flight();
    self.generation += 1;
    let cancel = CancellationToken::new();
    self.in_flight = Some(cancel.clone());
    debug!(generation = self.generation, kind = %query.kind, "query started");
    PendingQuery {
      generation: self.generation,
      query,
      cancel,
      store: Arc::clone(&self.store),
    }
  }

  /// Apply a finished query. Returns `false` if the outcome was superseded
  /// by a newer query and has been dropped.
  ///
  /// A failed query is shown exactly like a query with no matches.
  pub fn finish_query(&mut self, outcome: QueryOutcome<S::Error>) -> bool {
    if outcome.generation != self.generation {
      debug!(
        stale = outcome.generation,
        current = self.generation,
        "discarding stale query result"
      );
      return false;
    }

    self.in_flight = None;
    self.rows = match outcome.result {
      Ok(entities) => project_batch(&entities),
      Err(e) => {
        warn!(
          kind = %outcome.query.kind,
          error = %e,
          "query failed; showing no results"
        );
        Vec::new()
      }
    };
    self.last_query = Some(outcome.query);
    self.detail = None;
    self.view = View::Results;
    true
  }

  /// Run `query` to completion and move to the results view.
  pub async fn submit(&mut self, query: Query) -> &[ResultRow] {
    let outcome = self.begin_query(query).run().await;
    self.finish_query(outcome);
    &self.rows
  }

  /// Return to the query view, discarding the current batch. A query still
  /// in flight is cancelled.
  pub fn back(&mut self) {
    self.cancel_in_flight();
    self.generation += 1;
    self.view = View::Query;
    self.rows.clear();
    self.last_query = None;
    self.detail = None;
  }

  fn cancel_in_flight(&mut self) {
    if let Some(token) = self.in_flight.take() {
      token.cancel();
    }
  }

  // ── Detail overlay ────────────────────────────────────────────────────────

  /// Re-fetch the full entity behind result row `row_id`, open the detail
  /// overlay on it, and record it in the recency list.
  pub async fn open_details(&mut self, row_id: usize) -> anyhow::Result<&Entity> {
    if self.view != View::Results {
      return Err(anyhow!("no results are showing"));
    }
    let row = self
      .visible_rows()
      .into_iter()
      .find(|row| row.id == row_id)
      .cloned()
      .ok_or_else(|| anyhow!("no result row {row_id}"))?;

    let entity = self
      .store
      .get(row.summary.kind, &row.summary.document, &CancellationToken::new())
      .await
      .with_context(|| format!("looking up {}", row.summary.document))?
      .ok_or_else(|| {
        anyhow!("{} is no longer in the store", row.summary.document)
      })?;

    self.recent = self.recent.record(&entity);
    let entity: &Entity = self.detail.insert(entity);
    Ok(entity)
  }

  pub fn close_details(&mut self) { self.detail = None; }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use consulta_core::kind::SearchKind;
  use consulta_store_memory::{Error as StoreError, MemoryStore};

  use super::*;

  fn session() -> Session<MemoryStore> {
    let store = MemoryStore::seeded()
      .unwrap()
      .with_latency(Duration::ZERO);
    Session::new(Arc::new(store), 10)
  }

  fn query(kind: SearchKind, term: &str) -> Query {
    Query::new(kind, term).unwrap()
  }

  #[tokio::test]
  async fn starts_on_the_query_view() {
    let s = session();
    assert_eq!(s.view(), View::Query);
    assert!(s.rows().is_empty());
    assert!(s.recent().is_empty());
    assert!(!s.is_pending());
  }

  #[tokio::test]
  async fn submit_moves_to_results() {
    let mut s = session();
    let rows = s.submit(query(SearchKind::Name, "santos")).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 1);
    assert_eq!(s.view(), View::Results);
    assert_eq!(s.count_label(), "2 resultados");
    assert_eq!(s.last_query().map(|q| q.kind), Some(SearchKind::Name));
  }

  #[tokio::test]
  async fn zero_matches_still_shows_results_view() {
    let mut s = session();
    let rows = s.submit(query(SearchKind::Name, "Zebedeu")).await;
    assert!(rows.is_empty());
    assert_eq!(s.view(), View::Results);
    assert_eq!(s.count_label(), "0 resultados");
  }

  #[tokio::test]
  async fn failed_query_looks_like_no_matches() {
    let mut s = session();
    s.submit(query(SearchKind::Name, "santos")).await;

    let pending = s.begin_query(query(SearchKind::Name, "silva"));
    let outcome = QueryOutcome {
      generation: pending.generation(),
      query:      pending.query().clone(),
      result:     Err(StoreError::Cancelled),
    };
    assert!(s.finish_query(outcome));
    assert_eq!(s.view(), View::Results);
    assert!(s.rows().is_empty());
    assert!(!s.is_pending());
  }

  #[tokio::test]
  async fn back_discards_the_batch() {
    let mut s = session();
    s.submit(query(SearchKind::Name, "santos")).await;
    s.open_details(1).await.unwrap();

    s.back();
    assert_eq!(s.view(), View::Query);
    assert!(s.rows().is_empty());
    assert!(s.detail().is_none());
    assert!(s.last_query().is_none());
    // The recency list outlives the batch.
    assert_eq!(s.recent().len(), 1);
  }

  #[tokio::test]
  async fn filter_hides_rows_by_kind() {
    let mut s = session();
    s.submit(query(SearchKind::Address, "São Paulo")).await;
    let total = s.rows().len();

    s.set_filter(EntityKind::Organization, false);
    let visible = s.visible_rows();
    assert!(visible.len() < total);
    assert!(
      visible
        .iter()
        .all(|row| row.summary.kind == EntityKind::Individual)
    );

    s.set_filter(EntityKind::Individual, false);
    assert!(s.visible_rows().is_empty());
    assert_eq!(s.rows().len(), total);
  }

  #[tokio::test]
  async fn open_details_fetches_and_records() {
    let mut s = session();
    s.submit(query(SearchKind::Cpf, "123.456.789-01")).await;

    let entity = s.open_details(1).await.unwrap();
    assert_eq!(entity.name(), "Lucas Silva");
    assert_eq!(s.detail().map(Entity::document), Some("123.456.789-01"));
    assert_eq!(
      s.recent().front().map(|e| e.summary.document.as_str()),
      Some("123.456.789-01")
    );

    s.close_details();
    assert!(s.detail().is_none());
    assert_eq!(s.view(), View::Results);
  }

  #[tokio::test]
  async fn repeated_details_keep_one_recent_entry() {
    let mut s = session();
    s.submit(query(SearchKind::Name, "santos")).await;
    s.open_details(1).await.unwrap();
    s.open_details(2).await.unwrap();
    s.open_details(1).await.unwrap();

    let names: Vec<_> = s.recent().iter().map(|e| e.summary.name.as_str()).collect();
    assert_eq!(names, ["João Santos", "Maria Santos"]);
  }

  #[tokio::test]
  async fn open_details_rejects_unknown_or_hidden_rows() {
    let mut s = session();
    assert!(s.open_details(1).await.is_err());

    s.submit(query(SearchKind::Name, "santos")).await;
    assert!(s.open_details(9).await.is_err());

    s.set_filter(EntityKind::Individual, false);
    assert!(s.open_details(1).await.is_err());
    assert!(s.recent().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn newer_query_wins_over_stale_completion() {
    let store = MemoryStore::seeded().unwrap();
    let mut s = Session::new(Arc::new(store), 10);

    let first = s.begin_query(query(SearchKind::Name, "santos"));
    let second = s.begin_query(query(SearchKind::Name, "silva"));
    assert!(s.is_pending());

    let first = tokio::spawn(first.run());
    let second = tokio::spawn(second.run());
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    // The first query was cancelled when the second began.
    assert!(matches!(first.result, Err(StoreError::Cancelled)));

    assert!(s.finish_query(second));
    assert!(!s.finish_query(first));
    let names: Vec<_> = s.rows().iter().map(|r| r.summary.name.as_str()).collect();
    assert_eq!(names, ["Lucas Silva"]);
    assert!(!s.is_pending());
  }

  #[tokio::test(start_paused = true)]
  async fn back_while_pending_drops_the_completion() {
    let store = MemoryStore::seeded().unwrap();
    let mut s = Session::new(Arc::new(store), 10);

    let pending = s.begin_query(query(SearchKind::Name, "santos"));
    s.back();
    let outcome = pending.run().await;

    assert!(!s.finish_query(outcome));
    assert_eq!(s.view(), View::Query);
    assert!(!s.is_pending());
  }
}

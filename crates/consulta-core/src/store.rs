//! The `EntityStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `consulta-store-memory`). The CLI depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
  Result,
  entity::{Entity, EntityKind},
  kind::SearchKind,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// A validated `(kind, term)` pair, ready to hand to [`EntityStore::search`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
  pub kind: SearchKind,
  pub term: String,
}

impl Query {
  /// Validate `term` for `kind` and normalise it (see
  /// [`SearchKind::prepare`]).
  pub fn new(kind: SearchKind, term: &str) -> Result<Self> {
    Ok(Self {
      kind,
      term: kind.prepare(term)?,
    })
  }

  /// Build a query without validating the term. The engine will simply fail
  /// to match a malformed term.
  pub fn unchecked(kind: SearchKind, term: impl Into<String>) -> Self {
    Self {
      kind,
      term: term.into(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a read-only entity store.
///
/// `search` and `get` model a network round-trip: they may be slow, and they
/// observe a [`CancellationToken`] so an abandoned request can be dropped
/// early. Cancellation is reported through `Self::Error`. `all` is a local
/// listing and returns without delay.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return every entity matching `query`, in store order. No matches is an
  /// empty vector, not an error.
  fn search<'a>(
    &'a self,
    query: &'a Query,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + 'a;

  /// Recover a full entity from the `(kind, document)` pair of a summary
  /// row. Documents are compared without punctuation. Returns `None` if no
  /// entity of that kind carries the document.
  fn get<'a>(
    &'a self,
    kind: EntityKind,
    document: &'a str,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send + 'a;

  /// List the whole dataset, in store order.
  fn all(&self) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_validates_and_masks() {
    let query = Query::new(SearchKind::Cnpj, "12345678000199").unwrap();
    assert_eq!(query.term, "12.345.678/0001-99");
    assert!(Query::new(SearchKind::Email, "nope").is_err());
  }

  #[test]
  fn unchecked_keeps_term_verbatim() {
    let query = Query::unchecked(SearchKind::Cpf, " 1 ");
    assert_eq!(query.term, " 1 ");
  }
}

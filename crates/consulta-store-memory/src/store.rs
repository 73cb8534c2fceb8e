//! [`MemoryStore`]: the in-memory implementation of [`EntityStore`].

use std::{sync::Arc, time::Duration};

use consulta_core::{
  entity::{Entity, EntityKind},
  matching,
  store::{EntityStore, Query},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{Error, Result, seed};

/// Emulated round-trip delay applied to every read.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fixed, immutable collection of entities.
///
/// Cloning is cheap: the dataset is reference-counted and never changes
/// after construction; there is no mutation API.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  entities: Arc<[Entity]>,
  latency:  Duration,
}

impl MemoryStore {
  /// Build a store from the embedded seed dataset.
  pub fn seeded() -> Result<Self> { Self::from_json(seed::SEED_JSON) }

  /// Build a store from a JSON array of entities.
  pub fn from_json(raw: &str) -> Result<Self> {
    Self::from_entities(seed::parse(raw)?)
  }

  /// Build a store from `entities`, checking ids and documents.
  pub fn from_entities(entities: Vec<Entity>) -> Result<Self> {
    seed::validate(&entities)?;
    info!(count = entities.len(), "entity store loaded");
    Ok(Self {
      entities: entities.into(),
      latency:  DEFAULT_LATENCY,
    })
  }

  /// Replace the emulated round-trip delay.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn latency(&self) -> Duration { self.latency }

  pub fn len(&self) -> usize { self.entities.len() }

  pub fn is_empty(&self) -> bool { self.entities.is_empty() }

  /// Wait out the emulated network delay, or give up as soon as `cancel`
  /// fires.
  async fn round_trip(&self, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(Error::Cancelled),
      _ = tokio::time::sleep(self.latency) => Ok(()),
    }
  }
}

impl EntityStore for MemoryStore {
  type Error = Error;

  async fn search(
    &self,
    query: &Query,
    cancel: &CancellationToken,
  ) -> Result<Vec<Entity>> {
    self.round_trip(cancel).await?;

    let hits: Vec<Entity> = self
      .entities
      .iter()
      .filter(|entity| matching::matches(query.kind, entity, &query.term))
      .cloned()
      .collect();

    debug!(kind = %query.kind, term = %query.term, hits = hits.len(), "search");
    Ok(hits)
  }

  async fn get(
    &self,
    kind: EntityKind,
    document: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Entity>> {
    self.round_trip(cancel).await?;

    let found = self
      .entities
      .iter()
      .find(|entity| entity.kind() == kind && entity.has_document(document))
      .cloned();

    debug!(?kind, document, found = found.is_some(), "get");
    Ok(found)
  }

  async fn all(&self) -> Result<Vec<Entity>> { Ok(self.entities.to_vec()) }
}

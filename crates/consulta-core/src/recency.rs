//! The recency list: previously viewed entities, most recent first.
//!
//! The list is bounded and keyed by document number: recording an entity
//! whose document is already present moves it to the front instead of
//! duplicating it. Recording never mutates the existing list; it returns a
//! new one.

use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{DATE_FORMAT, Entity, normalize_document},
  projection::Summary,
};

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// A previously viewed entity and when it was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyEntry {
  #[serde(flatten)]
  pub summary:    Summary,
  pub queried_at: DateTime<Utc>,
}

impl RecencyEntry {
  pub fn new(entity: &Entity, queried_at: DateTime<Utc>) -> Self {
    Self {
      summary: Summary::of(entity),
      queried_at,
    }
  }

  /// The lookup date in the local time zone, `dd/mm/yyyy`.
  pub fn formatted_date(&self) -> String {
    self
      .queried_at
      .with_timezone(&Local)
      .format(DATE_FORMAT)
      .to_string()
  }

  fn key(&self) -> String { normalize_document(&self.summary.document) }
}

/// A bounded, deduplicated, most-recent-first list of [`RecencyEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyList {
  capacity: usize,
  entries:  VecDeque<RecencyEntry>,
}

impl Default for RecencyList {
  fn default() -> Self { Self::new(DEFAULT_CAPACITY) }
}

impl RecencyList {
  /// An empty list holding at most `capacity` entries (at least one).
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      capacity,
      entries: VecDeque::with_capacity(capacity),
    }
  }

  pub fn capacity(&self) -> usize { self.capacity }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Entries from most to least recent.
  pub fn iter(&self) -> impl Iterator<Item = &RecencyEntry> {
    self.entries.iter()
  }

  pub fn front(&self) -> Option<&RecencyEntry> { self.entries.front() }

  /// The entry for `document`, compared without punctuation.
  pub fn get(&self, document: &str) -> Option<&RecencyEntry> {
    let key = normalize_document(document);
    self.entries.iter().find(|e| e.key() == key)
  }

  /// Record a lookup of `entity` happening now.
  pub fn record(&self, entity: &Entity) -> Self {
    self.record_at(entity, Utc::now())
  }

  /// Record a lookup of `entity` at `queried_at`.
  pub fn record_at(&self, entity: &Entity, queried_at: DateTime<Utc>) -> Self {
    self.with_entry(RecencyEntry::new(entity, queried_at))
  }

  /// A new list with `entry` at the front, any older entry for the same
  /// document removed, and the tail evicted down to capacity.
  pub fn with_entry(&self, entry: RecencyEntry) -> Self {
    let key = entry.key();
    let entries = std::iter::once(entry)
      .chain(self.entries.iter().filter(|e| e.key() != key).cloned())
      .take(self.capacity)
      .collect();
    Self {
      capacity: self.capacity,
      entries,
    }
  }
}

impl<'a> IntoIterator for &'a RecencyList {
  type IntoIter = std::collections::vec_deque::Iter<'a, RecencyEntry>;
  type Item = &'a RecencyEntry;

  fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

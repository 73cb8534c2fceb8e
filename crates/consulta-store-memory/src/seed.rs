//! The embedded seed dataset and its load-time checks.

use std::collections::HashSet;

use consulta_core::entity::{Entity, EntityKind, digits};

use crate::{Error, Result};

/// The dataset shipped with the binary.
pub(crate) const SEED_JSON: &str = include_str!("../seed/entities.json");

/// Parse a JSON array of entities.
pub(crate) fn parse(raw: &str) -> Result<Vec<Entity>> {
  Ok(serde_json::from_str(raw)?)
}

/// Reject datasets with repeated ids, repeated documents, or documents with
/// the wrong number of digits for their variant.
pub(crate) fn validate(entities: &[Entity]) -> Result<()> {
  let mut ids = HashSet::new();
  let mut documents = HashSet::new();

  for entity in entities {
    if !ids.insert(entity.id()) {
      return Err(Error::DuplicateId(entity.id()));
    }

    let document = digits(entity.document());
    let expected = match entity.kind() {
      EntityKind::Individual => 11,
      EntityKind::Organization => 14,
    };
    if document.len() != expected {
      return Err(Error::MalformedDocument {
        id:       entity.id(),
        document: entity.document().to_owned(),
      });
    }

    if !documents.insert(document) {
      return Err(Error::DuplicateDocument(entity.document().to_owned()));
    }
  }

  Ok(())
}

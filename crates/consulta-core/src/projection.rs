//! Summary projections of entities: never stored, always derived.

use serde::{Deserialize, Serialize};

use crate::{
  entity::{Entity, EntityKind},
  kind::SearchKind,
};

/// Placeholder for a contact field the entity does not have.
pub const NOT_AVAILABLE: &str = "N/A";

/// Number of initials kept in an avatar.
pub const AVATAR_LEN: usize = 2;

/// First letter of each whitespace-separated token, upper-cased.
pub fn initials(name: &str) -> String {
  name
    .split_whitespace()
    .filter_map(|token| token.chars().next())
    .flat_map(char::to_uppercase)
    .collect()
}

/// [`initials`] truncated to [`AVATAR_LEN`] characters.
pub fn avatar(name: &str) -> String {
  initials(name).chars().take(AVATAR_LEN).collect()
}

/// The single-line view of an entity shared by result rows and recency
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub kind:     EntityKind,
  pub name:     String,
  /// CPF or CNPJ, as stored.
  pub document: String,
  pub avatar:   String,
  pub phone:    String,
  pub email:    String,
  pub address:  String,
}

impl Summary {
  pub fn of(entity: &Entity) -> Self {
    let or_na =
      |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_owned());
    Self {
      kind:     entity.kind(),
      name:     entity.name().to_owned(),
      document: entity.document().to_owned(),
      avatar:   avatar(entity.name()),
      phone:    or_na(entity.phones().first().map(|p| p.number.clone())),
      email:    or_na(entity.emails().first().cloned()),
      address:  or_na(entity.addresses().first().map(ToString::to_string)),
    }
  }

  /// The search kind that recovers the full entity from [`Self::document`].
  pub fn lookup_kind(&self) -> SearchKind { SearchKind::for_document(self.kind) }
}

/// One line of a result batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
  /// 1-based position within the batch; not stable across queries.
  pub id:      usize,
  #[serde(flatten)]
  pub summary: Summary,
}

/// Project a batch of matches into rows numbered by position.
pub fn project_batch(entities: &[Entity]) -> Vec<ResultRow> {
  entities
    .iter()
    .enumerate()
    .map(|(index, entity)| ResultRow {
      id:      index + 1,
      summary: Summary::of(entity),
    })
    .collect()
}

/// Label for the size of a result batch, e.g. `"3 resultados"`.
pub fn count_label(count: usize) -> String {
  if count == 1 {
    "1 resultado".to_owned()
  } else {
    format!("{count} resultados")
  }
}

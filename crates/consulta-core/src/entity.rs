//! Entity types: the records the lookup tool searches over.
//!
//! An entity is either a natural person ([`Individual`], identified by a CPF)
//! or a registered company ([`Organization`], identified by a CNPJ). Entities
//! are plain immutable data; nothing in the crate mutates one after it has
//! been loaded.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used everywhere a date is shown to the user (pt-BR).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which variant of [`Entity`] a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Individual,
  Organization,
}

impl EntityKind {
  /// Short tag shown next to summary rows.
  pub fn tag(&self) -> &'static str {
    match self {
      Self::Individual => "PF",
      Self::Organization => "PJ",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Individual => "Pessoa Física",
      Self::Organization => "Pessoa Jurídica",
    }
  }
}

// ─── Contact sub-types ───────────────────────────────────────────────────────

/// A telephone number with a free-text label ("Celular", "Comercial", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
  pub label:  String,
  /// Formatted number, e.g. `(11) 91234-5678`.
  pub number: String,
}

/// A postal address. All fields are plain strings; no normalisation is
/// applied beyond what the seed data carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street:       String,
  pub number:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub complement:   Option<String>,
  pub neighborhood: String,
  pub city:         String,
  /// Two-letter state code.
  pub state:        String,
  pub postal_code:  String,
}

impl Address {
  /// Every populated field, in declaration order.
  pub fn fields(&self) -> impl Iterator<Item = &str> {
    [
      Some(self.street.as_str()),
      Some(self.number.as_str()),
      self.complement.as_deref(),
      Some(self.neighborhood.as_str()),
      Some(self.city.as_str()),
      Some(self.state.as_str()),
      Some(self.postal_code.as_str()),
    ]
    .into_iter()
    .flatten()
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}, {}, {}, {} - {}",
      self.street, self.number, self.neighborhood, self.city, self.state
    )
  }
}

/// A holder of an ownership stake in an [`Organization`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
  pub name: String,
  pub cpf:  String,
}

// ─── Variants ────────────────────────────────────────────────────────────────

/// A natural person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
  pub id:          Uuid,
  pub name:        String,
  /// Formatted as `###.###.###-##`.
  pub cpf:         String,
  pub sex:         String,
  pub birth_date:  NaiveDate,
  pub mother_name: String,
  #[serde(default)]
  pub phones:      Vec<Phone>,
  #[serde(default)]
  pub emails:      Vec<String>,
  #[serde(default)]
  pub addresses:   Vec<Address>,
}

/// A registered company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub id:                  Uuid,
  pub name:                String,
  /// Formatted as `##.###.###/####-##`.
  pub cnpj:                String,
  /// Currency string, e.g. `R$ 100.000,00`.
  pub share_capital:       String,
  pub activity_start:      NaiveDate,
  pub registration_status: String,
  /// Primary CNAE activity code, e.g. `62.01-5-01`.
  pub main_activity:       String,
  #[serde(default)]
  pub phones:              Vec<Phone>,
  #[serde(default)]
  pub emails:              Vec<String>,
  #[serde(default)]
  pub addresses:           Vec<Address>,
  #[serde(default)]
  pub partners:            Vec<Partner>,
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A searchable record. The `kind` tag doubles as the JSON discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
  Individual(Individual),
  Organization(Organization),
}

impl Entity {
  pub fn id(&self) -> Uuid {
    match self {
      Self::Individual(i) => i.id,
      Self::Organization(o) => o.id,
    }
  }

  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Individual(_) => EntityKind::Individual,
      Self::Organization(_) => EntityKind::Organization,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Self::Individual(i) => &i.name,
      Self::Organization(o) => &o.name,
    }
  }

  /// The CPF of an individual or the CNPJ of an organisation, as stored.
  pub fn document(&self) -> &str {
    match self {
      Self::Individual(i) => &i.cpf,
      Self::Organization(o) => &o.cnpj,
    }
  }

  pub fn phones(&self) -> &[Phone] {
    match self {
      Self::Individual(i) => &i.phones,
      Self::Organization(o) => &o.phones,
    }
  }

  pub fn emails(&self) -> &[String] {
    match self {
      Self::Individual(i) => &i.emails,
      Self::Organization(o) => &o.emails,
    }
  }

  pub fn addresses(&self) -> &[Address] {
    match self {
      Self::Individual(i) => &i.addresses,
      Self::Organization(o) => &o.addresses,
    }
  }

  /// Whether this entity's document equals `document` once punctuation is
  /// stripped from both sides.
  pub fn has_document(&self, document: &str) -> bool {
    let wanted = normalize_document(document);
    !wanted.is_empty() && normalize_document(self.document()) == wanted
  }
}

// ─── Normalisation helpers ───────────────────────────────────────────────────

/// Strip everything that is not an ASCII letter or digit.
pub fn normalize_document(value: &str) -> String {
  value.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Keep only the ASCII digits of `value`.
pub fn digits(value: &str) -> String {
  value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn address() -> Address {
    Address {
      street:       "Rua das Flores".into(),
      number:       "123".into(),
      complement:   Some("Apto 42".into()),
      neighborhood: "Centro".into(),
      city:         "São Paulo".into(),
      state:        "SP".into(),
      postal_code:  "01001-000".into(),
    }
  }

  #[test]
  fn address_display_skips_complement_and_postal_code() {
    assert_eq!(
      address().to_string(),
      "Rua das Flores, 123, Centro, São Paulo - SP"
    );
  }

  #[test]
  fn address_fields_include_optional_complement() {
    let binding = address();
    let fields: Vec<_> = binding.fields().collect();
    assert_eq!(fields.len(), 7);
    assert!(fields.contains(&"Apto 42"));

    let mut bare = address();
    bare.complement = None;
    assert_eq!(bare.fields().count(), 6);
  }

  #[test]
  fn normalisation_strips_punctuation() {
    assert_eq!(normalize_document("12.345.678/0001-99"), "12345678000199");
    assert_eq!(digits("(11) 91234-5678"), "11912345678");
  }

  #[test]
  fn entity_json_uses_kind_tag() {
    let raw = serde_json::json!({
      "kind": "organization",
      "id": "6f1c2b8e-3c0a-4f5e-9d7b-1a2b3c4d5e6f",
      "name": "Empresa Exemplo Ltda",
      "cnpj": "12.345.678/0001-99",
      "share_capital": "R$ 100.000,00",
      "activity_start": "2010-05-10",
      "registration_status": "Ativa",
      "main_activity": "62.01-5-01"
    });
    let entity: Entity = serde_json::from_value(raw).unwrap();
    assert_eq!(entity.kind(), EntityKind::Organization);
    assert_eq!(entity.document(), "12.345.678/0001-99");
    assert!(entity.phones().is_empty());
    assert!(entity.has_document("12345678000199"));
    assert!(!entity.has_document(""));
  }
}

//! Search kinds: which field of an entity a query is matched against.
//!
//! Each kind also carries the input rules the form applies before a query is
//! ever sent: an optional mask for the punctuated kinds and a shape check.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  entity::{EntityKind, digits},
};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Minimum length of a free-text (address or name) term.
pub const MIN_FREE_TEXT_LEN: usize = 3;

/// The selector that decides which entity fields a query matches.
///
/// Tags are the lower-case Portuguese names used on the wire (`cpf`, `cnpj`,
/// `email`, `telefone`, `endereco`, `nome`); the English names are accepted
/// as aliases when parsing.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SearchKind {
  #[serde(rename = "cpf")]
  #[strum(to_string = "cpf")]
  Cpf,
  #[serde(rename = "cnpj")]
  #[strum(to_string = "cnpj")]
  Cnpj,
  #[serde(rename = "email")]
  #[strum(to_string = "email", serialize = "e-mail")]
  Email,
  #[serde(rename = "telefone", alias = "phone")]
  #[strum(to_string = "telefone", serialize = "phone")]
  Phone,
  #[serde(rename = "endereco", alias = "address")]
  #[strum(to_string = "endereco", serialize = "address")]
  Address,
  #[serde(rename = "nome", alias = "name")]
  #[strum(to_string = "nome", serialize = "name")]
  Name,
}

impl SearchKind {
  /// Parse a kind tag, mapping failures into the crate error.
  pub fn parse(tag: &str) -> Result<Self> {
    tag
      .trim()
      .parse()
      .map_err(|_| Error::UnknownSearchKind(tag.to_owned()))
  }

  /// Human-readable label for the kind selector.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Cpf => "CPF",
      Self::Cnpj => "CNPJ",
      Self::Email => "E-mail",
      Self::Phone => "Telefone",
      Self::Address => "Endereço",
      Self::Name => "Nome",
    }
  }

  /// Input mask for the punctuated kinds; `9` stands for one digit.
  pub fn mask(&self) -> Option<&'static str> {
    match self {
      Self::Cpf => Some("999.999.999-99"),
      Self::Cnpj => Some("99.999.999/9999-99"),
      Self::Phone => Some("(99) 99999-9999"),
      Self::Email | Self::Address | Self::Name => None,
    }
  }

  /// The entity variant a document kind is restricted to.
  pub fn entity_kind(&self) -> Option<EntityKind> {
    match self {
      Self::Cpf => Some(EntityKind::Individual),
      Self::Cnpj => Some(EntityKind::Organization),
      Self::Email | Self::Phone | Self::Address | Self::Name => None,
    }
  }

  /// The document kind used to look up an entity of variant `kind`.
  pub fn for_document(kind: EntityKind) -> Self {
    match kind {
      EntityKind::Individual => Self::Cpf,
      EntityKind::Organization => Self::Cnpj,
    }
  }

  /// Check that `term` has the shape this kind expects.
  pub fn validate(&self, term: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidTerm {
      kind: *self,
      term: term.to_owned(),
      reason,
    };
    let term = term.trim();
    match self {
      Self::Cpf if digits(term).len() != 11 => Err(invalid("CPF must have 11 digits")),
      Self::Cnpj if digits(term).len() != 14 => {
        Err(invalid("CNPJ must have 14 digits"))
      }
      Self::Email if !EMAIL_SHAPE.is_match(term) => {
        Err(invalid("expected an address like name@domain.tld"))
      }
      Self::Phone if digits(term).len() != 11 => {
        Err(invalid("expected area code and 9 digits"))
      }
      Self::Address | Self::Name
        if term.chars().count() < MIN_FREE_TEXT_LEN =>
      {
        Err(invalid("at least 3 characters are required"))
      }
      _ => Ok(()),
    }
  }

  /// Validate `term` and bring it into the form the engine expects: bare
  /// digit strings are punctuated with the kind's mask, everything else is
  /// trimmed.
  pub fn prepare(&self, term: &str) -> Result<String> {
    self.validate(term)?;
    let term = term.trim();
    let is_bare = term.chars().all(|c| c.is_ascii_digit());
    Ok(
      self
        .mask()
        .filter(|_| is_bare)
        .and_then(|mask| apply_mask(mask, term))
        .unwrap_or_else(|| term.to_owned()),
    )
  }
}

/// Format `digits` into `mask`, where each `9` consumes one digit.
///
/// Returns `None` unless `digits` fills every slot exactly.
pub fn apply_mask(mask: &str, digits: &str) -> Option<String> {
  let slots = mask.chars().filter(|c| *c == '9').count();
  if digits.len() != slots || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }

  let mut source = digits.chars();
  mask
    .chars()
    .map(|slot| match slot {
      '9' => source.next(),
      other => Some(other),
    })
    .collect()
}

//! Kind-specific predicates deciding whether an entity answers a query.
//!
//! The engine does not validate terms; a malformed term simply fails to
//! match. Every predicate is a pure function of the entity and the term.

use crate::{
  entity::{Entity, digits, normalize_document},
  kind::SearchKind,
};

/// Whether `entity` satisfies a `kind` query for `term`.
pub fn matches(kind: SearchKind, entity: &Entity, term: &str) -> bool {
  match kind {
    SearchKind::Cpf | SearchKind::Cnpj => {
      kind.entity_kind() == Some(entity.kind())
        && document_matches(term, entity.document())
    }
    SearchKind::Email => {
      let term = term.to_lowercase();
      entity.emails().iter().any(|email| email_matches(email, &term))
    }
    SearchKind::Phone => {
      let wanted = digits(term);
      !wanted.is_empty()
        && entity
          .phones()
          .iter()
          .any(|phone| digits(&phone.number).contains(&wanted))
    }
    SearchKind::Address => {
      let term = term.to_lowercase();
      entity.addresses().iter().any(|address| {
        address
          .fields()
          .any(|field| field.to_lowercase().contains(&term))
      })
    }
    SearchKind::Name => entity.name().to_lowercase().contains(&term.to_lowercase()),
  }
}

/// Exact match on the normalised document, falling back to
/// [`partial_match`].
pub fn document_matches(term: &str, document: &str) -> bool {
  let wanted = normalize_document(term);
  !wanted.is_empty()
    && (wanted == normalize_document(document) || partial_match(term, document))
}

/// Loose positional comparison of two identifiers.
///
/// Both sides are reduced to their ASCII alphanumerics and compared position
/// by position up to the shorter length. The candidate is accepted when at
/// least half of the query's characters agree. An empty query never matches.
pub fn partial_match(term: &str, value: &str) -> bool {
  let term = normalize_document(term);
  let value = normalize_document(value);
  if term.is_empty() {
    return false;
  }
  let agreeing = term
    .bytes()
    .zip(value.bytes())
    .filter(|(a, b)| a == b)
    .count();
  agreeing * 2 >= term.len()
}

/// `term` must already be lower-cased.
fn email_matches(email: &str, term: &str) -> bool {
  let email = email.to_lowercase();
  if email == term || email.contains(term) {
    return true;
  }
  match (domain(&email), domain(term)) {
    (Some(a), Some(b)) => a == b,
    _ => false,
  }
}

fn domain(address: &str) -> Option<&str> {
  address.split_once('@').map(|(_, domain)| domain)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;
  use crate::entity::{Address, Individual, Organization, Partner, Phone};

  fn lucas() -> Entity {
    Entity::Individual(Individual {
      id:          Uuid::new_v4(),
      name:        "Lucas Silva".into(),
      cpf:         "123.456.789-01".into(),
      sex:         "Masculino".into(),
      birth_date:  NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
      mother_name: "Maria Silva".into(),
      phones:      vec![Phone {
        label:  "Celular".into(),
        number: "(11) 91234-5678".into(),
      }],
      emails:      vec!["lucas@lemeforense.com.br".into()],
      addresses:   vec![Address {
        street:       "Rua das Flores".into(),
        number:       "123".into(),
        complement:   Some("Bloco B".into()),
        neighborhood: "Centro".into(),
        city:         "São Paulo".into(),
        state:        "SP".into(),
        postal_code:  "01001-000".into(),
      }],
    })
  }

  fn empresa() -> Entity {
    Entity::Organization(Organization {
      id:                  Uuid::new_v4(),
      name:                "Empresa Exemplo Ltda".into(),
      cnpj:                "12.345.678/0001-99".into(),
      share_capital:       "R$ 100.000,00".into(),
      activity_start:      NaiveDate::from_ymd_opt(2010, 5, 10).unwrap(),
      registration_status: "Ativa".into(),
      main_activity:       "62.01-5-01".into(),
      phones:              vec![Phone {
        label:  "Comercial".into(),
        number: "(11) 4002-8922".into(),
      }],
      emails:              vec!["contato@empresaexemplo.com.br".into()],
      addresses:           Vec::new(),
      partners:            vec![Partner {
        name: "João Souza".into(),
        cpf:  "987.654.321-00".into(),
      }],
    })
  }

  #[test]
  fn partial_match_accepts_half_agreement() {
    assert!(partial_match("123.456.789-00", "123.456.789-01"));
    assert!(!partial_match("123.456.789-00", "987.654.321-00"));
    // 12345678900 vs 12378945601 agree in 4 of 11 positions.
    assert!(!partial_match("123.456.789-00", "123.789.456-01"));
  }

  #[test]
  fn partial_match_compares_up_to_shorter_length() {
    // A short query agreeing fully on its prefix qualifies.
    assert!(partial_match("1234", "123.456.789-01"));
    // A long query only gets credit for the overlapping positions.
    assert!(!partial_match("12345678901234", "1234"));
    assert!(!partial_match("", "123.456.789-01"));
    assert!(!partial_match("...", "123.456.789-01"));
  }

  #[test]
  fn document_kinds_respect_variant() {
    assert!(matches(SearchKind::Cpf, &lucas(), "123.456.789-01"));
    assert!(matches(SearchKind::Cpf, &lucas(), "12345678901"));
    assert!(!matches(SearchKind::Cnpj, &lucas(), "123.456.789-01"));
    assert!(matches(SearchKind::Cnpj, &empresa(), "12.345.678/0001-99"));
    assert!(!matches(SearchKind::Cpf, &empresa(), "12.345.678/0001-99"));
  }

  #[test]
  fn email_matches_exact_substring_and_domain() {
    let lucas = lucas();
    assert!(matches(SearchKind::Email, &lucas, "LUCAS@lemeforense.com.br"));
    assert!(matches(SearchKind::Email, &lucas, "lucas@"));
    assert!(matches(SearchKind::Email, &lucas, "joao@lemeforense.com.br"));
    assert!(!matches(SearchKind::Email, &lucas, "lucas@outlook.com"));
    assert!(!matches(SearchKind::Email, &empresa(), "lucas@lemeforense.com.br"));
  }

  #[test]
  fn phone_matches_on_digits() {
    assert!(matches(SearchKind::Phone, &lucas(), "(11) 91234-5678"));
    assert!(matches(SearchKind::Phone, &lucas(), "91234"));
    assert!(!matches(SearchKind::Phone, &lucas(), "(21) 91234-5678"));
    assert!(!matches(SearchKind::Phone, &lucas(), "no digits"));
  }

  #[test]
  fn address_matches_any_field_case_insensitively() {
    assert!(matches(SearchKind::Address, &lucas(), "rua das flores"));
    assert!(matches(SearchKind::Address, &lucas(), "SÃO PAULO"));
    assert!(matches(SearchKind::Address, &lucas(), "bloco b"));
    assert!(matches(SearchKind::Address, &lucas(), "01001"));
    assert!(!matches(SearchKind::Address, &empresa(), "paulista"));
  }

  #[test]
  fn name_matches_substring() {
    assert!(matches(SearchKind::Name, &lucas(), "silva"));
    assert!(matches(SearchKind::Name, &empresa(), "EXEMPLO"));
    assert!(!matches(SearchKind::Name, &lucas(), "oliveira"));
  }
}

//! Plain-text and JSON rendering of rows, entities, and the recency list.

use std::fmt::{self, Write as _};

use consulta_core::{
  entity::{DATE_FORMAT, Entity, Phone},
  projection::{ResultRow, count_label, initials},
  recency::RecencyList,
};
use serde::Serialize;

use crate::config::OutputFormat;

// ─── Public entry points ──────────────────────────────────────────────────────

/// Render a result list with its count header.
pub fn rows(format: OutputFormat, rows: &[&ResultRow]) -> anyhow::Result<String> {
  match format {
    OutputFormat::Json => json(&rows),
    OutputFormat::Text => Ok(rows_text(rows)?),
  }
}

/// Render the detail view of a single entity.
pub fn detail(format: OutputFormat, entity: &Entity) -> anyhow::Result<String> {
  match format {
    OutputFormat::Json => json(entity),
    OutputFormat::Text => Ok(detail_text(entity)?),
  }
}

/// Render the recency list, most recent first.
pub fn recent(format: OutputFormat, list: &RecencyList) -> anyhow::Result<String> {
  match format {
    OutputFormat::Json => json(&list.iter().collect::<Vec<_>>()),
    OutputFormat::Text => Ok(recent_text(list)?),
  }
}

fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
  Ok(serde_json::to_string_pretty(value)?)
}

// ─── Text helpers ─────────────────────────────────────────────────────────────

fn rows_text(rows: &[&ResultRow]) -> Result<String, fmt::Error> {
  let mut out = String::new();
  writeln!(out, "{}", count_label(rows.len()))?;
  for row in rows {
    let s = &row.summary;
    writeln!(
      out,
      "{:>3}  [{}] {:<2}  {:<28} {}",
      row.id,
      s.kind.tag(),
      s.avatar,
      s.name,
      s.document
    )?;
    writeln!(out, "       {}  |  {}  |  {}", s.phone, s.email, s.address)?;
  }
  Ok(out)
}

fn detail_text(entity: &Entity) -> Result<String, fmt::Error> {
  let mut out = String::new();
  writeln!(
    out,
    "{} ({})  {}",
    entity.name(),
    initials(entity.name()),
    entity.kind().label()
  )?;

  match entity {
    Entity::Individual(i) => {
      field(&mut out, "CPF", &i.cpf)?;
      field(&mut out, "Sexo", &i.sex)?;
      field(&mut out, "Nascimento", i.birth_date.format(DATE_FORMAT))?;
      field(&mut out, "Mãe", &i.mother_name)?;
    }
    Entity::Organization(o) => {
      field(&mut out, "CNPJ", &o.cnpj)?;
      field(&mut out, "Capital social", &o.share_capital)?;
      field(
        &mut out,
        "Início atividades",
        o.activity_start.format(DATE_FORMAT),
      )?;
      field(&mut out, "Situação", &o.registration_status)?;
      field(&mut out, "CNAE principal", &o.main_activity)?;
    }
  }

  section(&mut out, "Telefones", entity.phones().iter().map(phone_line))?;
  section(&mut out, "E-mails", entity.emails().iter().cloned())?;
  section(
    &mut out,
    "Endereços",
    entity.addresses().iter().map(ToString::to_string),
  )?;
  if let Entity::Organization(o) = entity {
    section(
      &mut out,
      "Quadro societário",
      o.partners.iter().map(|p| format!("{} ({})", p.name, p.cpf)),
    )?;
  }
  Ok(out)
}

fn recent_text(list: &RecencyList) -> Result<String, fmt::Error> {
  if list.is_empty() {
    return Ok("Nenhuma consulta recente.\n".to_owned());
  }
  let mut out = String::new();
  for entry in list {
    let s = &entry.summary;
    writeln!(
      out,
      "{}  [{}] {:<2}  {:<28} {}",
      entry.formatted_date(),
      s.kind.tag(),
      s.avatar,
      s.name,
      s.document
    )?;
  }
  Ok(out)
}

fn phone_line(phone: &Phone) -> String {
  format!("{}: {}", phone.label, phone.number)
}

fn field(out: &mut String, label: &str, value: impl fmt::Display) -> fmt::Result {
  writeln!(out, "  {:<18} {value}", format!("{label}:"))
}

fn section(
  out: &mut String,
  title: &str,
  lines: impl Iterator<Item = String>,
) -> fmt::Result {
  writeln!(out, "\n{title}")?;
  let mut empty = true;
  for line in lines {
    empty = false;
    writeln!(out, "  {line}")?;
  }
  if empty {
    writeln!(out, "  (nenhum)")?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use chrono::{TimeZone, Utc};
  use consulta_core::{projection::project_batch, store::EntityStore};
  use consulta_store_memory::MemoryStore;

  use super::*;

  async fn seeded() -> Vec<Entity> {
    let store = MemoryStore::seeded().unwrap().with_latency(Duration::ZERO);
    store.all().await.unwrap()
  }

  fn by_name<'a>(entities: &'a [Entity], name: &str) -> &'a Entity {
    entities.iter().find(|e| e.name() == name).unwrap()
  }

  #[tokio::test]
  async fn text_rows_show_count_and_summary() {
    let entities = seeded().await;
    let batch = project_batch(&entities[..2]);
    let refs: Vec<_> = batch.iter().collect();
    let text = rows(OutputFormat::Text, &refs).unwrap();

    assert!(text.starts_with("2 resultados\n"));
    assert!(text.contains("[PF] LS"));
    assert!(text.contains("123.456.789-01"));
    assert!(text.contains("(11) 91234-5678  |  lucas@lemeforense.com.br"));
  }

  #[tokio::test]
  async fn json_rows_are_an_array() {
    let entities = seeded().await;
    let batch = project_batch(&entities[..1]);
    let refs: Vec<_> = batch.iter().collect();
    let text = rows(OutputFormat::Json, &refs).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["document"], "123.456.789-01");
    assert_eq!(value[0]["avatar"], "LS");
  }

  #[tokio::test]
  async fn organisation_detail_lists_partners() {
    let entities = seeded().await;
    let text = detail(
      OutputFormat::Text,
      by_name(&entities, "Empresa Exemplo Ltda"),
    )
    .unwrap();

    assert!(text.contains("Pessoa Jurídica"));
    assert!(text.contains("10/05/2010"));
    assert!(text.contains("Comercial: (11) 4002-8922"));
    assert!(text.contains("Av. Paulista, 1000, Bela Vista, São Paulo - SP"));
    assert!(text.contains("João Souza (987.654.321-00)"));

    let text =
      detail(OutputFormat::Text, by_name(&entities, "Comércio ABC Ltda")).unwrap();
    assert!(text.contains("Pedro Almeida (123.123.123-00)"));
  }

  #[tokio::test]
  async fn individual_detail_marks_empty_sections() {
    let entities = seeded().await;
    let text =
      detail(OutputFormat::Text, by_name(&entities, "Fernanda Rocha")).unwrap();

    assert!(text.contains("CPF:"));
    assert!(text.contains("17/06/1995"));
    assert!(text.contains("Telefones\n  (nenhum)"));
    assert!(!text.contains("Quadro societário"));
  }

  #[tokio::test]
  async fn recent_list_renders_dates() {
    let entities = seeded().await;
    let at = Utc.with_ymd_and_hms(2024, 12, 15, 12, 0, 0).unwrap();
    let list =
      RecencyList::default().record_at(by_name(&entities, "Ana Costa"), at);

    let text = recent(OutputFormat::Text, &list).unwrap();
    assert!(text.contains("/2024"));
    assert!(text.contains("[PF] AC"));

    let empty = recent(OutputFormat::Text, &RecencyList::default()).unwrap();
    assert_eq!(empty, "Nenhuma consulta recente.\n");

    let json = recent(OutputFormat::Json, &list).unwrap();
    assert!(json.contains("\"queried_at\""));
  }
}

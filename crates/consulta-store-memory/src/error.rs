//! Error type for `consulta-store-memory`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("seed data is not valid JSON: {0}")]
  Seed(#[from] serde_json::Error),

  #[error("duplicate entity id in seed data: {0}")]
  DuplicateId(uuid::Uuid),

  #[error("duplicate document in seed data: {0}")]
  DuplicateDocument(String),

  #[error("entity {id} has a malformed document {document:?}")]
  MalformedDocument { id: uuid::Uuid, document: String },

  /// The caller abandoned the request before the round-trip finished.
  #[error("query cancelled")]
  Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

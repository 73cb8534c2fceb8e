//! Error types for `consulta-core`.

use thiserror::Error;

use crate::kind::SearchKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid {kind} term {term:?}: {reason}")]
  InvalidTerm {
    kind:   SearchKind,
    term:   String,
    reason: &'static str,
  },

  #[error("unknown search kind: {0:?}")]
  UnknownSearchKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

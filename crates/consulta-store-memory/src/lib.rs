//! In-memory backend for the Consulta entity store.
//!
//! The dataset is an embedded JSON seed, deserialised and validated once when
//! the store is built. Every read waits out an emulated network round-trip
//! that the caller can cancel.

mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_LATENCY, MemoryStore};

//! Core types and trait definitions for the Consulta lookup tool.
//!
//! This crate is deliberately free of I/O. It holds the entity model, the
//! search kinds and their matching rules, the summary projections shown to the
//! user, and the [`store::EntityStore`] abstraction that backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod kind;
pub mod matching;
pub mod projection;
pub mod recency;
pub mod store;

pub use error::{Error, Result};

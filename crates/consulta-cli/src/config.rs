//! Layered settings: defaults, then an optional TOML file, then `CONSULTA_*`
//! environment variables, then command-line flags.

use std::{path::Path, time::Duration};

use anyhow::Context;
use clap::ValueEnum;
use consulta_core::recency::DEFAULT_CAPACITY;
use serde::Deserialize;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  fn as_str(&self) -> &'static str {
    match self {
      Self::Text => "text",
      Self::Json => "json",
    }
  }
}

/// Runtime settings for the `consulta` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Emulated round-trip delay, in milliseconds.
  pub latency_ms:      u64,
  pub recent_capacity: usize,
  pub format:          OutputFormat,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      latency_ms:      500,
      recent_capacity: DEFAULT_CAPACITY,
      format:          OutputFormat::default(),
    }
  }
}

impl Settings {
  pub fn latency(&self) -> Duration { Duration::from_millis(self.latency_ms) }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub latency_ms: Option<u64>,
  pub format:     Option<OutputFormat>,
}

/// Read settings from `path` (if it exists) and the environment, then apply
/// `overrides`.
pub fn load(path: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
  load_with_env(path, None, overrides)
}

/// As [`load`], reading `CONSULTA_*` variables from `env` instead of the
/// process environment when it is given.
fn load_with_env(
  path: &Path,
  env: Option<config::Map<String, String>>,
  overrides: &Overrides,
) -> anyhow::Result<Settings> {
  let raw = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("CONSULTA")
        .try_parsing(true)
        .source(env),
    )
    .set_override_option("latency_ms", overrides.latency_ms)
    .context("applying --latency-ms")?
    .set_override_option("format", overrides.format.map(|f| f.as_str()))
    .context("applying --format")?
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?;

  raw
    .try_deserialize()
    .context("failed to deserialise settings")
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading a pre-parsed document.
#[derive(Debug, Error)]
pub enum InputError {
  #[error("failed to read document `{path}`: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse JSON document `{path}`: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to parse TOML document `{path}`: {source}")]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("unsupported document format: {0} (expected .json or .toml)")]
  Unsupported(PathBuf),
}

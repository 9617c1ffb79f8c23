use std::{io, path::PathBuf};

use tagdoc_config::ConfigError;
use thiserror::Error;

/// Errors that abort an HTML run.
#[derive(Debug, Error)]
pub enum HtmlError {
  /// The configuration failed pre-flight validation; nothing was written.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// An output file could not be created.
  #[error("failed to create `{path}`: {source}")]
  Create {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  /// Writing to an open output file failed.
  #[error("failed to write `{path}`: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  /// A finished file could not be patched. The original is left untouched.
  #[error("failed to resolve cross references in `{path}`: {source}")]
  Rewrite {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

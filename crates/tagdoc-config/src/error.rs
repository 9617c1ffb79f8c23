use thiserror::Error;

/// Error type for tagdoc-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  /// One or more settings are missing or obsolete. Each entry carries the
  /// problem together with the fix.
  #[error("Invalid configuration:\n{}", .0.join("\n"))]
  Validation(Vec<String>),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}

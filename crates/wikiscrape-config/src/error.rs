use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for wikiscrape-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read config file {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON config from {}: {source}", .path.display())]
  Serde {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to parse TOML config from {}: {source}", .path.display())]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("Invalid pattern: {0}")]
  Regex(#[from] regex::Error),
}

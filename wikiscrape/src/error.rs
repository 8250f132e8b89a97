use std::{io, path::PathBuf};

use thiserror::Error;
use wikiscrape_config::ConfigError;
use wikiscrape_html::{IndexError, ScrapeError};

/// Top-level error type for the wikiscrape crate.
#[derive(Debug, Error)]
pub enum WikiscrapeError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Index(#[from] IndexError),

  #[error(transparent)]
  Scrape(#[from] ScrapeError),

  #[error("Refusing to overwrite existing file: {0}")]
  OutputExists(PathBuf),

  #[error("No HTML files found in {0}")]
  NoPages(PathBuf),

  #[error("No page with short name '{0}' in the manifest")]
  UnknownRoot(String),

  #[error("The manifest does not list any pages")]
  EmptyManifest,

  #[error("Total of {0} problems found")]
  CheckFailed(usize),

  #[error("Failed to read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}

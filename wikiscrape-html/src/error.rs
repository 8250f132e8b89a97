use std::{io, path::PathBuf};

use thiserror::Error;

use crate::index::PageId;

/// Errors raised while building or querying the page index.
///
/// Every variant is fatal for the run: a page without a stable identity cannot
/// be converted, and short-name collisions would make output ambiguous.
#[derive(Debug, Error)]
pub enum IndexError {
  #[error("Failed to read manifest {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Malformed manifest at byte {position}: {source}")]
  Xml {
    position: u64,
    #[source]
    source:   quick_xml::Error,
  },

  #[error("Manifest page entry is missing the '{0}' attribute")]
  MissingAttribute(&'static str),

  #[error("Manifest page id is not numeric: '{0}'")]
  InvalidId(String),

  #[error("Page {0} has an empty title")]
  EmptyTitle(PageId),

  #[error("Page id {0} is listed more than once in the manifest")]
  DuplicateId(PageId),

  #[error(
    "Multiple pages with short name '{short_name}': {first} and {second}"
  )]
  ShortNameCollision {
    short_name: String,
    first:      PageId,
    second:     PageId,
  },

  #[error("No manifest entry for page id {0}")]
  NotFound(PageId),
}

/// Errors raised while converting page content.
#[derive(Debug, Error)]
pub enum ScrapeError {
  #[error(transparent)]
  Index(#[from] IndexError),

  #[error("Unrecognised table of contents shape in {page}: {markup}")]
  TocShape { page: String, markup: String },

  #[error("Admonition has more than one title in {page}: {markup}")]
  AdmonitionTitles { page: String, markup: String },

  #[error("No main-content region in {0}")]
  MissingMainContent(String),

  #[error("Unable to find attachment {source_path} for {page}")]
  MissingAttachment {
    page:        String,
    source_path: PathBuf,
  },

  #[error("Invalid selector: {0}")]
  Selector(&'static str),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),
}

use std::{
  collections::BTreeMap,
  fmt,
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use url::Url;
use wikiscrape_html::{
  ContentFragment,
  MAIN_CONTENT_ID,
  dom::{attr, is_tag},
};

use crate::{error::WikiscrapeError, utils::collect_html_files};

/// Ids the site generator emits on every page.
const IGNORED_IDS: [&str; 2] = ["preamble", MAIN_CONTENT_ID];

static VALIDATION_BASE: LazyLock<Option<Url>> =
  LazyLock::new(|| Url::parse("http://site.invalid/").ok());

/// A single integrity problem in a built site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
  EmptyHref {
    file: PathBuf,
  },
  /// A relative link that does not name an anchor.
  MissingFragment {
    file: PathBuf,
    href: String,
  },
  InvalidHref {
    file:   PathBuf,
    href:   String,
    reason: String,
  },
  DuplicateId {
    id:    String,
    files: Vec<PathBuf>,
  },
}

impl fmt::Display for Problem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EmptyHref { file } => {
        write!(f, "{} contains link with empty href", file.display())
      },
      Self::MissingFragment { file, href } => {
        write!(
          f,
          "{} contains relative link without an '#anchor': {href}",
          file.display()
        )
      },
      Self::InvalidHref { file, href, reason } => {
        write!(
          f,
          "{} contains link with invalid syntax: {href} ({reason})",
          file.display()
        )
      },
      Self::DuplicateId { id, files } => {
        write!(f, "ID occurs multiple times: {id}")?;
        for file in files {
          write!(f, "\n ... {}", file.display())?;
        }
        Ok(())
      },
    }
  }
}

/// Outcome of checking a built site.
#[derive(Debug, Default)]
pub struct CheckReport {
  pub pages:    usize,
  pub problems: Vec<Problem>,
}

impl CheckReport {
  #[must_use]
  pub const fn is_clean(&self) -> bool {
    self.problems.is_empty()
  }
}

fn check_href(file: &Path, href: &str) -> Option<Problem> {
  if href.is_empty() {
    return Some(Problem::EmptyHref {
      file: file.to_path_buf(),
    });
  }

  let invalid = |reason: String| {
    Problem::InvalidHref {
      file: file.to_path_buf(),
      href: href.to_string(),
      reason,
    }
  };

  match Url::parse(href) {
    Ok(_) => None,
    Err(url::ParseError::RelativeUrlWithoutBase) => {
      let joined = VALIDATION_BASE.as_ref().map(|base| base.join(href));
      match joined {
        Some(Err(e)) => Some(invalid(e.to_string())),
        Some(Ok(url)) if url.fragment().is_some_and(|f| !f.is_empty()) => None,
        _ => {
          Some(Problem::MissingFragment {
            file: file.to_path_buf(),
            href: href.to_string(),
          })
        },
      }
    },
    Err(e) => Some(invalid(e.to_string())),
  }
}

/// Check the main content of every page in a built site for broken links
/// and ids that are not unique across the site.
///
/// # Errors
///
/// Returns an error if the directory holds no HTML files, a page cannot be
/// read, or a page has no main content element. Content problems are not
/// errors; they are collected in the report.
pub fn check_site(dir: &Path) -> Result<CheckReport, WikiscrapeError> {
  let pages = collect_html_files(dir)?;
  if pages.is_empty() {
    return Err(WikiscrapeError::NoPages(dir.to_path_buf()));
  }

  let mut report = CheckReport {
    pages: pages.len(),
    ..Default::default()
  };
  let mut known_ids: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

  for file in &pages {
    let html = fs::read_to_string(file).map_err(|source| {
      WikiscrapeError::Read {
        path: file.clone(),
        source,
      }
    })?;
    let fragment = ContentFragment::from_page(&html, &file.to_string_lossy())?;

    for node in fragment.root().descendants() {
      if let Some(id) = attr(&node, "id")
        && !id.is_empty()
        && !IGNORED_IDS.contains(&id.as_str())
      {
        known_ids.entry(id).or_default().push(file.clone());
      }
      if is_tag(&node, &["a"])
        && let Some(href) = attr(&node, "href")
        && let Some(problem) = check_href(file, &href)
      {
        report.problems.push(problem);
      }
    }
  }

  report.problems.extend(
    known_ids
      .into_iter()
      .filter(|(_, files)| files.len() > 1)
      .map(|(id, files)| Problem::DuplicateId { id, files }),
  );

  log::debug!(
    "Checked {} pages, {} problems",
    report.pages,
    report.problems.len()
  );
  Ok(report)
}

//! The page index: stable identities for every page in the export.
//!
//! The index is built once from the manifest and is read-only afterwards.
//! Everything that names a page in the output (file names, permalinks, link
//! targets, attachment directories) goes through it, so short names are
//! never derived from file names anywhere else.
mod manifest;

use std::{
  collections::HashMap,
  path::Path,
  sync::LazyLock,
};

use regex::Regex;

use crate::{error::IndexError, utils::static_regex};

/// Numeric page identifier from the manifest.
pub type PageId = u64;

/// Suffix appended to a short name to form the permalink.
pub const PERMALINK_SUFFIX: &str = ".html";

static SHORT_NAME_SEPARATORS: LazyLock<Regex> =
  LazyLock::new(|| static_regex("SHORT_NAME_SEPARATORS", r"[^a-z0-9]+"));

static EXPORT_FILE_NAME: LazyLock<Regex> =
  LazyLock::new(|| static_regex("EXPORT_FILE_NAME", r"^.*?\D?(\d+)\.html$"));

/// A page from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
  pub id:         PageId,
  pub title:      String,
  pub short_name: String,
  pub permalink:  String,
  parent:         Option<usize>,
  children:       Vec<usize>,
}

/// Derive the canonical short name for a title.
///
/// Lower-cases the title, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims separators from both ends.
///
/// Returns `None` when nothing alphanumeric is left.
///
/// ```
/// use wikiscrape_html::index::short_name;
///
/// assert_eq!(short_name("Getting Started!!").as_deref(), Some("getting-started"));
/// assert_eq!(short_name("  ").as_deref(), None);
/// ```
#[must_use]
pub fn short_name(title: &str) -> Option<String> {
  let lowered = title.to_lowercase();
  let collapsed = SHORT_NAME_SEPARATORS.replace_all(&lowered, "-");
  let trimmed = collapsed.trim_matches('-');
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read-only lookup table over all pages of the manifest.
#[derive(Debug, Default)]
pub struct PageIndex {
  /// Pages in manifest (pre-)order.
  pages:         Vec<Page>,
  by_id:         HashMap<PageId, usize>,
  by_short_name: HashMap<String, usize>,
  roots:         Vec<usize>,
}

impl PageIndex {
  /// Load and index a manifest file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the
  /// manifest contains duplicate ids, empty titles or colliding short names.
  pub fn from_file(path: &Path) -> Result<Self, IndexError> {
    let xml = std::fs::read_to_string(path).map_err(|source| {
      IndexError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;
    Self::from_xml(&xml)
  }

  /// Index a manifest from its XML text.
  ///
  /// # Errors
  ///
  /// See [`PageIndex::from_file`].
  pub fn from_xml(xml: &str) -> Result<Self, IndexError> {
    let index = manifest::parse(xml)?;
    log::debug!(
      "Indexed {} pages ({} roots)",
      index.pages.len(),
      index.roots.len()
    );
    Ok(index)
  }

  /// Register a page. Called in manifest order while parsing.
  fn insert(
    &mut self,
    id: PageId,
    title: &str,
    parent: Option<usize>,
  ) -> Result<usize, IndexError> {
    if self.by_id.contains_key(&id) {
      return Err(IndexError::DuplicateId(id));
    }
    let short_name = short_name(title).ok_or(IndexError::EmptyTitle(id))?;
    if let Some(&existing) = self.by_short_name.get(&short_name) {
      return Err(IndexError::ShortNameCollision {
        short_name,
        first: self.pages[existing].id,
        second: id,
      });
    }

    let slot = self.pages.len();
    self.pages.push(Page {
      id,
      title: title.to_string(),
      permalink: format!("{short_name}{PERMALINK_SUFFIX}"),
      short_name: short_name.clone(),
      parent,
      children: Vec::new(),
    });
    self.by_id.insert(id, slot);
    self.by_short_name.insert(short_name, slot);
    match parent {
      Some(parent) => self.pages[parent].children.push(slot),
      None => self.roots.push(slot),
    }
    Ok(slot)
  }

  /// Look up a page by id.
  ///
  /// # Errors
  ///
  /// Returns [`IndexError::NotFound`] if the manifest has no such page.
  pub fn resolve_by_id(&self, id: PageId) -> Result<&Page, IndexError> {
    self
      .by_id
      .get(&id)
      .map(|&slot| &self.pages[slot])
      .ok_or(IndexError::NotFound(id))
  }

  /// Look up the page an exported file (or a link to one) refers to.
  ///
  /// Only the file name is considered; it must end in a numeric id followed
  /// by `.html`. `Ok(None)` means the path does not name a tracked page at
  /// all, which callers handle as an ordinary case. That includes digit runs
  /// too long to be a page id.
  ///
  /// # Errors
  ///
  /// Returns [`IndexError::NotFound`] if the file name carries an id the
  /// manifest does not know.
  pub fn resolve_by_source_path(
    &self,
    path: &str,
  ) -> Result<Option<&Page>, IndexError> {
    let Some(file_name) = Path::new(path).file_name().and_then(|f| f.to_str())
    else {
      return Ok(None);
    };
    let Some(captures) = EXPORT_FILE_NAME.captures(file_name) else {
      return Ok(None);
    };
    let Ok(id) = captures[1].parse::<PageId>() else {
      log::debug!("{file_name}: digits do not fit a page id");
      return Ok(None);
    };
    self.resolve_by_id(id).map(Some)
  }

  /// Look up a page by its short name.
  #[must_use]
  pub fn resolve_by_short_name(&self, short_name: &str) -> Option<&Page> {
    self
      .by_short_name
      .get(short_name)
      .map(|&slot| &self.pages[slot])
  }

  fn slot_of(&self, page: &Page) -> Option<usize> {
    self.by_id.get(&page.id).copied()
  }

  /// Children of a page, in manifest order.
  pub fn children_of<'a>(
    &'a self,
    page: &Page,
  ) -> impl Iterator<Item = &'a Page> + use<'a> {
    let children = self
      .slot_of(page)
      .map(|slot| self.pages[slot].children.as_slice())
      .unwrap_or_default();
    children.iter().map(move |&child| &self.pages[child])
  }

  /// Short names of a page's children, in manifest order.
  #[must_use]
  pub fn child_short_names(&self, page: &Page) -> Vec<&str> {
    self
      .children_of(page)
      .map(|child| child.short_name.as_str())
      .collect()
  }

  /// The page listing this page as a child, if any.
  #[must_use]
  pub fn parent_of(&self, page: &Page) -> Option<&Page> {
    self
      .slot_of(page)
      .and_then(|slot| self.pages[slot].parent)
      .map(|parent| &self.pages[parent])
  }

  /// Top-level pages, in manifest order.
  pub fn roots(&self) -> impl Iterator<Item = &Page> {
    self.roots.iter().map(move |&slot| &self.pages[slot])
  }

  /// All pages, in manifest order.
  pub fn pages(&self) -> impl Iterator<Item = &Page> {
    self.pages.iter()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.pages.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  /// Depth-first walk from `start`, yielding each page with its depth
  /// relative to `start` (which has depth 0).
  #[must_use]
  pub fn walk<'a>(&'a self, start: &Page) -> Vec<(usize, &'a Page)> {
    let mut out = Vec::new();
    let Some(slot) = self.slot_of(start) else {
      return out;
    };
    let mut stack = vec![(0, slot)];
    while let Some((depth, slot)) = stack.pop() {
      let page = &self.pages[slot];
      out.push((depth, page));
      // reversed so the first child is visited first
      stack.extend(page.children.iter().rev().map(|&child| (depth + 1, child)));
    }
    out
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pages>
  <page id="1" title="Reference Guide">
    <page id="42" title="Getting Started!!">
      <page id="43" title="Installing &amp; Running"/>
      <page id="44" title="A Quick Overview"/>
    </page>
    <page id="50" title="Upgrading"/>
  </page>
  <page id="99" title="Orphans"/>
</pages>"#;

  #[test]
  fn test_short_name_rules() {
    assert_eq!(short_name("Foo Bar!").as_deref(), Some("foo-bar"));
    assert_eq!(short_name("foo  bar").as_deref(), Some("foo-bar"));
    assert_eq!(short_name("C++ & Java 8").as_deref(), Some("c-java-8"));
    assert_eq!(short_name("--Already-Slugged--").as_deref(), Some("already-slugged"));
    assert_eq!(short_name(""), None);
    assert_eq!(short_name(" \t"), None);
    assert_eq!(short_name("!!!"), None);
  }

  #[test]
  fn test_index_lookups() {
    let index = PageIndex::from_xml(MANIFEST).unwrap();
    assert_eq!(index.len(), 6);

    let page = index.resolve_by_id(42).unwrap();
    assert_eq!(page.title, "Getting Started!!");
    assert_eq!(page.short_name, "getting-started");
    assert_eq!(page.permalink, "getting-started.html");
    assert_eq!(
      index.child_short_names(page),
      vec!["installing-running", "a-quick-overview"]
    );
    assert_eq!(index.parent_of(page).unwrap().id, 1);
    assert!(index.parent_of(index.resolve_by_id(1).unwrap()).is_none());

    let roots: Vec<_> = index.roots().map(|p| p.id).collect();
    assert_eq!(roots, vec![1, 99]);
    assert_eq!(
      index.resolve_by_short_name("upgrading").map(|p| p.id),
      Some(50)
    );
  }

  #[test]
  fn test_resolve_by_id_not_found() {
    let index = PageIndex::from_xml(MANIFEST).unwrap();
    assert!(matches!(
      index.resolve_by_id(7),
      Err(IndexError::NotFound(7))
    ));
  }

  #[test]
  fn test_resolve_by_source_path() {
    let index = PageIndex::from_xml(MANIFEST).unwrap();
    for path in [
      "42.html",
      "Getting-Started_42.html",
      "export/space/Getting-Started_42.html",
      "../x42.html",
    ] {
      let page = index.resolve_by_source_path(path).unwrap();
      assert_eq!(page.map(|p| p.id), Some(42), "for {path}");
    }

    assert!(index.resolve_by_source_path("index.html").unwrap().is_none());
    assert!(index.resolve_by_source_path("42.htm").unwrap().is_none());
    assert!(index.resolve_by_source_path("").unwrap().is_none());
    assert!(
      index
        .resolve_by_source_path("Release-Notes_99999999999999999999999.html")
        .unwrap()
        .is_none()
    );
    assert!(matches!(
      index.resolve_by_source_path("Missing_1234.html"),
      Err(IndexError::NotFound(1234))
    ));
  }

  #[test]
  fn test_walk_is_depth_first_in_manifest_order() {
    let index = PageIndex::from_xml(MANIFEST).unwrap();
    let root = index.resolve_by_id(1).unwrap();
    let walk: Vec<_> =
      index.walk(root).into_iter().map(|(d, p)| (d, p.id)).collect();
    assert_eq!(walk, vec![(0, 1), (1, 42), (2, 43), (2, 44), (1, 50)]);
  }
}

//! Owned page body fragments.
use kuchikikiki::NodeRef;
use tendril::TendrilSink;

use crate::{
  dom::{inner_html, new_element},
  error::ScrapeError,
};

/// Id of the element wrapping the main content of an exported page.
pub const MAIN_CONTENT_ID: &str = "main-content";

/// The body of a single page while it moves through the conversion stages.
///
/// The fragment owns a detached `<body>` element; the page chrome it was cut
/// from is dropped. It deliberately does not implement [`Clone`]: cloning a
/// [`NodeRef`] shares the tree, and two stages must never hold the same body.
#[derive(Debug)]
pub struct ContentFragment {
  root: NodeRef,
}

impl ContentFragment {
  /// Wrap an existing node as the single child of a fresh fragment root.
  #[must_use]
  pub fn from_node(node: NodeRef) -> Self {
    let root = new_element("body", &[]);
    root.append(node);
    Self { root }
  }

  /// Parse an HTML snippet as body content.
  #[must_use]
  pub fn from_html(html: &str) -> Self {
    let document = kuchikikiki::parse_html().one(format!(
      "<!DOCTYPE html><html><head></head><body>{html}</body></html>"
    ));
    let root = new_element("body", &[]);
    if let Ok(body) = document.select_first("body") {
      let body = body.as_node();
      while let Some(child) = body.first_child() {
        root.append(child);
      }
    }
    Self { root }
  }

  /// Parse a complete exported page and cut out its main content region.
  ///
  /// Non-breaking spaces are normalized to ordinary spaces before parsing;
  /// the export uses them liberally and the conversion treats them as plain
  /// whitespace.
  ///
  /// # Errors
  ///
  /// Returns [`ScrapeError::MissingMainContent`] if the page has no element
  /// with id [`MAIN_CONTENT_ID`].
  pub fn from_page(html: &str, page: &str) -> Result<Self, ScrapeError> {
    let html = html.replace('\u{a0}', " ");
    let document = kuchikikiki::parse_html().one(html);
    let main = document
      .select_first("#main-content")
      .map_err(|()| ScrapeError::MissingMainContent(page.to_string()))?;
    Ok(Self::from_node(main.as_node().clone()))
  }

  /// The fragment root. Its children are the page content.
  #[must_use]
  pub const fn root(&self) -> &NodeRef {
    &self.root
  }

  /// Give up the fragment, returning its root element.
  #[must_use]
  pub fn into_root(self) -> NodeRef {
    self.root
  }

  /// Serialize the fragment content (without the root element).
  #[must_use]
  pub fn to_html(&self) -> String {
    inner_html(&self.root)
  }
}

//! Link and anchor resolution against the page index.
use std::{borrow::Cow, sync::LazyLock};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::{
  ContentFragment,
  dom::{attr, elements_named, set_attr},
  index::PageIndex,
  policy::ConversionPolicy,
  types::LinkTarget,
  utils::clean_id,
};

/// Base used only to check that a relative reference is well formed.
static VALIDATION_BASE: LazyLock<Option<Url>> =
  LazyLock::new(|| Url::parse("http://relative.invalid/").ok());

fn decode(text: &str) -> Cow<'_, str> {
  percent_decode_str(text).decode_utf8_lossy()
}

/// Counts of the targets seen while resolving one page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkSummary {
  pub absolute:      usize,
  pub same_document: usize,
  pub cross_page:    usize,
  pub unresolved:    usize,
  pub malformed:     usize,
}

impl LinkSummary {
  fn record(&mut self, target: &LinkTarget) {
    match target {
      LinkTarget::Absolute(_) => self.absolute += 1,
      LinkTarget::SameDocumentFragment(_) => self.same_document += 1,
      LinkTarget::CrossPage { .. } => self.cross_page += 1,
      LinkTarget::Unresolved(_) => self.unresolved += 1,
      LinkTarget::Malformed(_) => self.malformed += 1,
    }
  }
}

/// Rewrites hyperlinks of normalized pages.
#[derive(Debug, Clone, Copy)]
pub struct LinkResolver<'a> {
  index:  &'a PageIndex,
  policy: &'a ConversionPolicy,
}

impl<'a> LinkResolver<'a> {
  #[must_use]
  pub const fn new(index: &'a PageIndex, policy: &'a ConversionPolicy) -> Self {
    Self { index, policy }
  }

  /// Classify a single `href` found on `page`.
  #[must_use]
  pub fn classify(&self, href: &str, page: &str) -> LinkTarget {
    match Url::parse(href) {
      Ok(url) => {
        let rewritten = self
          .policy
          .external_doc_rules
          .iter()
          .find_map(|rule| rule.apply(&url));
        LinkTarget::Absolute(rewritten.unwrap_or_else(|| href.to_string()))
      },
      Err(url::ParseError::RelativeUrlWithoutBase) => {
        self.classify_relative(href, page)
      },
      Err(e) => {
        log::warn!("{page}: malformed link '{href}': {e}");
        LinkTarget::Malformed(href.to_string())
      },
    }
  }

  fn classify_relative(&self, href: &str, page: &str) -> LinkTarget {
    if let Some(base) = VALIDATION_BASE.as_ref()
      && let Err(e) = base.join(href)
    {
      log::warn!("{page}: malformed link '{href}': {e}");
      return LinkTarget::Malformed(href.to_string());
    }

    let (rest, fragment) = href
      .split_once('#')
      .map_or((href, None), |(rest, fragment)| (rest, Some(fragment)));
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    let fragment = fragment
      .filter(|fragment| !fragment.is_empty())
      .map(|fragment| clean_id(&decode(fragment)));

    if path.is_empty() {
      return if let Some(fragment) = fragment {
        LinkTarget::SameDocumentFragment(fragment)
      } else {
        log::warn!("{page}: link '{href}' has neither path nor fragment");
        LinkTarget::Unresolved(href.to_string())
      };
    }

    match self.index.resolve_by_source_path(&decode(path)) {
      Ok(Some(target)) => {
        LinkTarget::CrossPage {
          short_name: target.short_name.clone(),
          fragment:   fragment.unwrap_or_else(|| target.short_name.clone()),
        }
      },
      Ok(None) => {
        log::warn!("{page}: unresolved link '{href}'");
        LinkTarget::Unresolved(href.to_string())
      },
      Err(e) => {
        log::warn!("{page}: unresolved link '{href}': {e}");
        LinkTarget::Unresolved(href.to_string())
      },
    }
  }

  /// Rewrite every `a[href]` of a fragment in place.
  ///
  /// Never fails: links that cannot be resolved are logged and kept, so they
  /// can be found in the output.
  pub fn resolve(
    &self,
    fragment: ContentFragment,
    page: &str,
  ) -> (ContentFragment, LinkSummary) {
    let mut summary = LinkSummary::default();
    for link in elements_named(fragment.root(), &["a"]) {
      let Some(href) = attr(&link, "href") else {
        continue;
      };
      let target = self.classify(&href, page);
      summary.record(&target);
      let rewritten =
        target.to_href(&self.policy.link_marker, &self.policy.link_extension);
      if rewritten != href {
        log::trace!("{page}: '{href}' -> '{rewritten}'");
        set_attr(&link, "href", &rewritten);
      }
    }
    log::debug!("{page}: {summary:?}");
    (fragment, summary)
  }
}

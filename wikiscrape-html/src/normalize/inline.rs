//! Inline element clean-up.
use kuchikikiki::NodeRef;

use super::PassContext;
use crate::{
  ContentFragment,
  dom::{attr, classes, elements_named, is_tag, renders_nothing, unwrap},
  error::ScrapeError,
};

/// Elements removed (keeping their children) when they render nothing.
const UNWRAP_WHEN_EMPTY: [&str; 7] = ["strong", "b", "em", "i", "p", "code", "pre"];

/// Inline elements whose edge whitespace belongs outside them.
const INLINE_FORMATTING: [&str; 6] = ["span", "strong", "b", "em", "i", "code"];

pub(super) fn unwrap_empty(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  let candidates = fragment.root().descendants().filter(|node| {
    is_tag(node, &UNWRAP_WHEN_EMPTY)
      || (is_tag(node, &["span"]) && attr(node, "id").is_none())
  });
  for node in candidates.collect::<Vec<_>>() {
    if renders_nothing(&node) {
      unwrap(&node);
    }
  }
  Ok(fragment)
}

pub(super) fn unwrap_cosmetic(
  fragment: ContentFragment,
  ctx: &PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  let cosmetic = &ctx.policy.cosmetic_span_classes;
  for span in elements_named(fragment.root(), &["span"]) {
    if classes(&span).iter().any(|class| cosmetic.contains(class)) {
      unwrap(&span);
    }
  }
  Ok(fragment)
}

pub(super) fn relocate_whitespace(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  // innermost first, so whitespace bubbles out through nested formatting
  let mut elements = elements_named(fragment.root(), &INLINE_FORMATTING);
  elements.reverse();
  for element in elements {
    move_leading_whitespace(&element);
    move_trailing_whitespace(&element);
  }
  Ok(fragment)
}

fn move_leading_whitespace(element: &NodeRef) {
  let Some(first) = element.first_child() else {
    return;
  };
  let Some(text) = first.as_text() else {
    return;
  };
  let leading = {
    let mut text = text.borrow_mut();
    let trimmed = text.trim_start();
    let leading = text[..text.len() - trimmed.len()].to_string();
    let kept = trimmed.to_string();
    *text = kept;
    leading
  };
  if leading.is_empty() {
    return;
  }
  element.insert_before(NodeRef::new_text(leading));
  if text.borrow().is_empty() {
    first.detach();
  }
}

fn move_trailing_whitespace(element: &NodeRef) {
  let Some(last) = element.last_child() else {
    return;
  };
  let Some(text) = last.as_text() else {
    return;
  };
  let trailing = {
    let mut text = text.borrow_mut();
    let trimmed = text.trim_end();
    let trailing = text[trimmed.len()..].to_string();
    let kept = trimmed.to_string();
    *text = kept;
    trailing
  };
  if trailing.is_empty() {
    return;
  }
  element.insert_after(NodeRef::new_text(trailing));
  if text.borrow().is_empty() {
    last.detach();
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::policy::ConversionPolicy;

  fn html_after(
    pass: fn(ContentFragment) -> Result<ContentFragment, ScrapeError>,
    html: &str,
  ) -> String {
    pass(ContentFragment::from_html(html)).unwrap().to_html()
  }

  #[test]
  fn test_unwrap_empty_formatting() {
    assert_eq!(
      html_after(unwrap_empty, "<p>a<strong> </strong>b<em></em><code>\n</code></p>"),
      "<p>a b\n</p>"
    );
  }

  #[test]
  fn test_unwrap_empty_keeps_images_and_anchors() {
    let html = html_after(
      unwrap_empty,
      r#"<p><strong><img src="x.png"></strong><span id="anchor"></span><span> </span></p>"#,
    );
    assert_eq!(
      html,
      r#"<p><strong><img src="x.png"></strong><span id="anchor"></span> </p>"#
    );
  }

  #[test]
  fn test_unwrap_empty_paragraph() {
    assert_eq!(html_after(unwrap_empty, "<p>  </p><p>x</p>"), "  <p>x</p>");
  }

  #[test]
  fn test_unwrap_cosmetic_spans() {
    let policy = ConversionPolicy::default();
    let ctx = PassContext {
      policy:      &policy,
      page:        "t.html",
      id_rewrites: Vec::new(),
      has_toc:     false,
    };
    let fragment = ContentFragment::from_html(
      r#"<p><span class="nolink">a</span><span class="external-link">b</span><span class="other">c</span></p>"#,
    );
    let html = unwrap_cosmetic(fragment, &ctx).unwrap().to_html();
    assert_eq!(html, r#"<p>ab<span class="other">c</span></p>"#);
  }

  #[test]
  fn test_relocate_whitespace() {
    assert_eq!(
      html_after(relocate_whitespace, "<p>a<strong> bold </strong>b</p>"),
      "<p>a <strong>bold</strong> b</p>"
    );
  }

  #[test]
  fn test_relocate_whitespace_through_nesting() {
    assert_eq!(
      html_after(
        relocate_whitespace,
        "<p>x<strong><em> both </em></strong>y</p>"
      ),
      "<p>x <strong><em>both</em></strong> y</p>"
    );
  }

  #[test]
  fn test_relocate_whitespace_leaves_links_alone() {
    assert_eq!(
      html_after(relocate_whitespace, r#"<p><a href="x"> go </a></p>"#),
      r#"<p><a href="x"> go </a></p>"#
    );
  }
}

//! Passes over code elements and preformatted blocks.
use std::sync::LazyLock;

use kuchikikiki::NodeRef;
use regex::Regex;

use super::PassContext;
use crate::{
  ContentFragment,
  dom::{
    attr,
    elements_named,
    has_ancestor,
    is_tag,
    outer_html,
    remove_attr,
    set_attr,
    unwrap,
    wrap_children,
  },
  error::ScrapeError,
  utils::static_regex,
};

/// Emphasis elements inside code and the literal markers replacing them.
const EMPHASIS: [(&str, &str); 4] =
  [("strong", "*"), ("b", "*"), ("em", "_"), ("i", "_")];

static BRUSH_LANGUAGE: LazyLock<Regex> =
  LazyLock::new(|| static_regex("BRUSH_LANGUAGE", r"brush:\s*([^;]+)"));

pub(super) fn flatten_nested(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for code in elements_named(fragment.root(), &["code"]) {
    if has_ancestor(&code, &["code"]) {
      unwrap(&code);
    }
  }
  Ok(fragment)
}

pub(super) fn emphasis_to_literal(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  let tags = EMPHASIS.map(|(tag, _)| tag);
  for element in elements_named(fragment.root(), &tags) {
    if !has_ancestor(&element, &["code"]) {
      continue;
    }
    let Some((_, marker)) = EMPHASIS
      .iter()
      .find(|(tag, _)| is_tag(&element, &[*tag]))
    else {
      continue;
    };
    element.insert_before(NodeRef::new_text(*marker));
    element.insert_after(NodeRef::new_text(*marker));
    unwrap(&element);
  }
  Ok(fragment)
}

/// Turn `<code><a>x</a></code>` into `<a><code>x</code></a>`. A link whose
/// text is its own URL stays wrapped in the code.
pub(super) fn invert_links(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for code in elements_named(fragment.root(), &["code"]) {
    let children: Vec<_> = code.children().collect();
    let [link] = children.as_slice() else {
      continue;
    };
    if !is_tag(link, &["a"]) {
      continue;
    }
    if attr(link, "href").is_some_and(|href| href == link.text_contents()) {
      continue;
    }
    unwrap(&code);
    wrap_children(link, "code");
  }
  Ok(fragment)
}

pub(super) fn normalize_language(
  fragment: ContentFragment,
  ctx: &PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  for pre in elements_named(fragment.root(), &["pre"]) {
    let declared = attr(&pre, "class").and_then(|class| {
      BRUSH_LANGUAGE
        .captures(&class)
        .map(|captures| captures[1].trim().to_string())
    });
    let text = pre.text_contents();
    match ctx
      .policy
      .code_language
      .language_for(declared.as_deref(), text.trim_start())
    {
      Some(language) => set_attr(&pre, "class", &language),
      None => remove_attr(&pre, "class"),
    }
  }
  Ok(fragment)
}

pub(super) fn report_markup(
  fragment: ContentFragment,
  ctx: &PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  for code in elements_named(fragment.root(), &["code"]) {
    if code.children().any(|child| child.as_element().is_some()) {
      log::warn!(
        "{}: code element still contains markup: {}",
        ctx.page,
        outer_html(&code)
      );
    }
  }
  Ok(fragment)
}

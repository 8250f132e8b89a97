//! Heading anchors and element identifiers.
use std::collections::HashSet;

use kuchikikiki::NodeRef;

use super::PassContext;
use crate::{
  ContentFragment,
  dom::{
    HEADINGS,
    attr,
    elements_named,
    has_class,
    is_tag,
    previous_significant_sibling,
    remove_attr,
    set_attr,
  },
  error::ScrapeError,
  types::IdRewrite,
  utils::clean_id,
};

const ANCHOR_CLASS: &str = "confluence-anchor-link";

fn is_anchor(node: &NodeRef) -> bool {
  is_tag(node, &["span"]) && has_class(node, ANCHOR_CLASS)
}

/// Exchange the `id` attributes of two elements. A missing id moves too.
fn swap_ids(a: &NodeRef, b: &NodeRef) {
  let a_id = attr(a, "id");
  let b_id = attr(b, "id");
  for (node, id) in [(a, b_id), (b, a_id)] {
    match id {
      Some(id) => set_attr(node, "id", &id),
      None => remove_attr(node, "id"),
    }
  }
}

/// Give headings the id their author chose.
///
/// The export emits the author's anchor as a span next to (or inside) the
/// heading, while the heading itself carries a generated id. After this pass
/// the heading carries the anchor id and the span keeps the generated one,
/// so links to either still land on the heading.
pub(super) fn reconcile_headings(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for level in HEADINGS {
    let headings = elements_named(fragment.root(), &[level]);

    for heading in &headings {
      if let Some(anchor) =
        previous_significant_sibling(heading).filter(is_anchor)
      {
        swap_ids(&anchor, heading);
      }
    }

    for heading in &headings {
      let nested: Vec<_> = heading.descendants().filter(is_anchor).collect();
      for anchor in nested {
        swap_ids(&anchor, heading);
        heading.insert_before(anchor);
      }
    }
  }
  Ok(fragment)
}

pub(super) fn normalize_ids(
  fragment: ContentFragment,
  ctx: &mut PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  let mut seen = HashSet::new();
  for element in fragment.root().descendants().collect::<Vec<_>>() {
    let Some(old_id) = attr(&element, "id") else {
      continue;
    };
    let new_id = clean_id(&old_id);
    if new_id != old_id {
      log::warn!("{}: id '{old_id}' rewritten to '{new_id}'", ctx.page);
      element.insert_before(NodeRef::new_text(format!(
        "[id: {old_id} -> {new_id}] "
      )));
      set_attr(&element, "id", &new_id);
      ctx.id_rewrites.push(IdRewrite {
        old_id,
        new_id: new_id.clone(),
      });
    }
    if !seen.insert(new_id.clone()) {
      log::warn!("{}: duplicate id '{new_id}'", ctx.page);
    }
  }
  Ok(fragment)
}

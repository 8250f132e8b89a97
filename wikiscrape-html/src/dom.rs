//! Small helpers over the kuchikikiki DOM.
//!
//! Every traversal helper collects into a [`Vec`] before returning so callers
//! can detach, unwrap or re-parent nodes without invalidating the iterator
//! they got them from.

use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};

use crate::{error::ScrapeError, utils::is_blank};

/// Tags treated as headings by the anchor passes.
pub const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Create a new HTML element with the given attributes.
#[must_use]
pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attrs.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Create a paragraph holding a single text node.
#[must_use]
pub fn new_paragraph(text: &str) -> NodeRef {
  let p = new_element("p", &[]);
  p.append(NodeRef::new_text(text));
  p
}

/// Local tag name of an element node, or `None` for any other node kind.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
  node
    .as_element()
    .map(|element| element.name.local.as_ref().to_string())
}

/// Whether the node is an element with one of the given tag names.
#[must_use]
pub fn is_tag(node: &NodeRef, tags: &[&str]) -> bool {
  node
    .as_element()
    .is_some_and(|element| tags.contains(&element.name.local.as_ref()))
}

/// Read an attribute value.
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
  node.as_element().and_then(|element| {
    element.attributes.borrow().get(name).map(str::to_string)
  })
}

/// Set an attribute value. No-op for non-element nodes.
pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
  if let Some(element) = node.as_element() {
    element
      .attributes
      .borrow_mut()
      .insert(name, value.to_string());
  }
}

/// Remove an attribute. No-op for non-element nodes.
pub fn remove_attr(node: &NodeRef, name: &str) {
  if let Some(element) = node.as_element() {
    element.attributes.borrow_mut().remove(name);
  }
}

/// Whether the element's `class` attribute contains `class`.
#[must_use]
pub fn has_class(node: &NodeRef, class: &str) -> bool {
  attr(node, "class")
    .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// All classes of an element, in attribute order.
#[must_use]
pub fn classes(node: &NodeRef) -> Vec<String> {
  attr(node, "class")
    .map(|classes| classes.split_whitespace().map(str::to_string).collect())
    .unwrap_or_default()
}

/// Descendant elements (excluding `root`) with one of the given tag names,
/// in document order.
#[must_use]
pub fn elements_named(root: &NodeRef, tags: &[&str]) -> Vec<NodeRef> {
  root.descendants().filter(|node| is_tag(node, tags)).collect()
}

/// Run a CSS selector over the descendants of `root` (inclusive), in
/// document order.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if the selector does not parse.
pub fn select_all(
  root: &NodeRef,
  selector: &'static str,
) -> Result<Vec<NodeRef>, ScrapeError> {
  root
    .select(selector)
    .map(|matches| matches.map(|m| m.as_node().clone()).collect())
    .map_err(|()| ScrapeError::Selector(selector))
}

/// Replace an element with its children.
pub fn unwrap(node: &NodeRef) {
  while let Some(child) = node.first_child() {
    node.insert_before(child);
  }
  node.detach();
}

/// Wrap all children of `node` in a new `tag` element that becomes its only
/// child.
pub fn wrap_children(node: &NodeRef, tag: &str) {
  let wrapper = new_element(tag, &[]);
  while let Some(child) = node.first_child() {
    wrapper.append(child);
  }
  node.append(wrapper);
}

/// Whether a node renders no text.
///
/// Embedded images count as rendered content, so an element that only wraps
/// an `img` is not empty even though its text content is.
#[must_use]
pub fn renders_nothing(node: &NodeRef) -> bool {
  is_blank(&node.text_contents())
    && !node.descendants().any(|d| is_tag(&d, &["img"]))
}

/// Whether a node is a text node holding only whitespace.
#[must_use]
pub fn is_blank_text(node: &NodeRef) -> bool {
  node.as_text().is_some_and(|text| is_blank(&text.borrow()))
}

/// Previous sibling that is not whitespace-only text or a comment.
#[must_use]
pub fn previous_significant_sibling(node: &NodeRef) -> Option<NodeRef> {
  node
    .preceding_siblings()
    .find(|sibling| !is_blank_text(sibling) && sibling.as_comment().is_none())
}

/// Whether any proper ancestor of `node` is one of the given tags.
#[must_use]
pub fn has_ancestor(node: &NodeRef, tags: &[&str]) -> bool {
  node.ancestors().any(|ancestor| is_tag(&ancestor, tags))
}

/// Serialize a node (including itself) to HTML.
#[must_use]
pub fn outer_html(node: &NodeRef) -> String {
  node.to_string()
}

/// Serialize the children of a node to HTML.
#[must_use]
pub fn inner_html(node: &NodeRef) -> String {
  node.children().map(|child| child.to_string()).collect()
}

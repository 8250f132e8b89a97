//! Block structure clean-up and review markers.
use kuchikikiki::NodeRef;

use super::{BLOCK_TABLE_MARKER, NESTED_LIST_MARKER, PassContext};
use crate::{
  ContentFragment,
  dom::{
    HEADINGS,
    attr,
    elements_named,
    has_ancestor,
    is_blank_text,
    is_tag,
    new_paragraph,
    remove_attr,
    renders_nothing,
    unwrap,
  },
  error::ScrapeError,
};

const LISTS: [&str; 2] = ["ul", "ol"];

const CELLS: [&str; 2] = ["td", "th"];

/// Content that a table cell cannot hold in the target markup without
/// switching the cell to a nested document.
const CELL_BLOCKS: [&str; 6] = ["p", "ul", "ol", "pre", "table", "blockquote"];

pub(super) fn strip_styles(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for node in fragment.root().inclusive_descendants() {
    remove_attr(&node, "style");
  }
  Ok(fragment)
}

pub(super) fn unwrap_blocks(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for block in elements_named(fragment.root(), &["div", "tbody"]) {
    unwrap(&block);
  }
  Ok(fragment)
}

pub(super) fn remove_breaks(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for br in elements_named(fragment.root(), &["br"]) {
    br.detach();
  }
  Ok(fragment)
}

fn has_nested_list(list: &NodeRef) -> bool {
  list.descendants().any(|node| is_tag(&node, &LISTS))
}

fn has_block_cell(table: &NodeRef) -> bool {
  elements_named(table, &CELLS).iter().any(|cell| {
    cell.descendants().any(|node| {
      is_tag(&node, &CELL_BLOCKS) || is_tag(&node, &HEADINGS)
    })
  })
}

/// Put a review marker before shapes that need manual attention after
/// conversion. Only the outermost shape of each kind gets a marker.
pub(super) fn flag_shapes(
  fragment: ContentFragment,
  ctx: &PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  for list in elements_named(fragment.root(), &LISTS) {
    if !has_ancestor(&list, &LISTS) && has_nested_list(&list) {
      log::info!("{}: flagged nested list for review", ctx.page);
      list.insert_before(new_paragraph(NESTED_LIST_MARKER));
    }
  }
  for table in elements_named(fragment.root(), &["table"]) {
    if !has_ancestor(&table, &["table"]) && has_block_cell(&table) {
      log::info!("{}: flagged table with block content for review", ctx.page);
      table.insert_before(new_paragraph(BLOCK_TABLE_MARKER));
    }
  }
  Ok(fragment)
}

pub(super) fn strip_leading_spans(
  fragment: ContentFragment,
) -> Result<ContentFragment, ScrapeError> {
  for paragraph in elements_named(fragment.root(), &["p"]) {
    let mut cursor = paragraph.first_child();
    while let Some(node) = cursor {
      cursor = node.next_sibling();
      if is_blank_text(&node) {
        node.detach();
      } else if is_tag(&node, &["span"]) && renders_nothing(&node) {
        if attr(&node, "id").is_some() {
          for child in node.children().filter(is_blank_text).collect::<Vec<_>>()
          {
            child.detach();
          }
        } else {
          node.detach();
        }
      } else {
        break;
      }
    }
  }
  Ok(fragment)
}

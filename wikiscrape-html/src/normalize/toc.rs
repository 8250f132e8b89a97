//! Table of contents handling.
//!
//! The exported table of contents is replaced by a `toc::[]` placeholder so
//! the converted document builds its own at the same spot. Only three page
//! shapes have ever been seen; a TOC macro outside of them aborts so it can
//! be looked at.
use kuchikikiki::NodeRef;

use super::PassContext;
use crate::{
  ContentFragment,
  dom::{new_paragraph, outer_html, select_all},
  error::ScrapeError,
};

/// Placeholder left where the exported table of contents was.
const TOC_PLACEHOLDER: &str = "toc::[]";

pub(super) fn remove_toc(
  fragment: ContentFragment,
  ctx: &mut PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  if let Some(block) = find_toc_block(fragment.root())? {
    log::debug!("{}: replacing table of contents", ctx.page);
    block.insert_before(new_paragraph(TOC_PLACEHOLDER));
    block.detach();
    ctx.has_toc = true;
    return Ok(fragment);
  }

  let leftovers = select_all(fragment.root(), ".toc-macro")?;
  if !leftovers.is_empty() {
    return Err(ScrapeError::TocShape {
      page:   ctx.page.to_string(),
      markup: leftovers.iter().map(outer_html).collect::<Vec<_>>().join("\n"),
    });
  }
  Ok(fragment)
}

/// The first table of contents container of a recognised shape, tried in
/// order: an aside, a column layout holding the macro, the bare macro.
fn find_toc_block(root: &NodeRef) -> Result<Option<NodeRef>, ScrapeError> {
  if let Some(aside) = select_all(root, "[data-type=aside]")?.into_iter().next()
  {
    return Ok(Some(aside));
  }
  for column in select_all(root, "div.columnMacro")? {
    if !select_all(&column, ".toc-macro")?.is_empty() {
      return Ok(Some(column));
    }
  }
  Ok(select_all(root, "div.toc-macro")?.into_iter().next())
}

use std::{
  fs::OpenOptions,
  io::{self, Write},
  path::Path,
};

use kuchikikiki::NodeRef;
use wikiscrape_html::{ContentFragment, Page, dom::new_element};

use crate::error::WikiscrapeError;

fn meta(name: &str, content: &str) -> NodeRef {
  new_element("meta", &[("name", name), ("content", content)])
}

/// Wrap a converted page body into a standalone document.
///
/// The head carries the page title plus `page-shortname`, `page-permalink`
/// and one `page-children` meta per child, in manifest order, which is all
/// the downstream build needs to rebuild the page tree. Pages that had a
/// table of contents also get a `toc` meta.
#[must_use]
pub fn render_page(
  page: &Page,
  children: &[&str],
  has_toc: bool,
  body: ContentFragment,
) -> String {
  let html = new_element("html", &[]);
  let head = new_element("head", &[]);

  let title = new_element("title", &[]);
  title.append(NodeRef::new_text(page.title.as_str()));
  head.append(title);
  head.append(meta("page-shortname", &page.short_name));
  head.append(meta("page-permalink", &page.permalink));
  for child in children {
    head.append(meta("page-children", child));
  }
  if has_toc {
    head.append(meta("toc", "true"));
  }

  html.append(head);
  html.append(body.into_root());
  format!("<!DOCTYPE html>\n{html}\n")
}

/// Write `contents` to a file that must not exist yet.
///
/// # Errors
///
/// Returns [`WikiscrapeError::OutputExists`] if the file is already there,
/// or an I/O error if it cannot be written.
pub fn write_new(path: &Path, contents: &str) -> Result<(), WikiscrapeError> {
  let mut file = match OpenOptions::new().write(true).create_new(true).open(path)
  {
    Ok(file) => file,
    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
      return Err(WikiscrapeError::OutputExists(path.to_path_buf()));
    },
    Err(e) => return Err(e.into()),
  };
  file.write_all(contents.as_bytes())?;
  log::debug!("Wrote {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::fs;

  use wikiscrape_html::PageIndex;

  use super::*;

  #[test]
  fn test_render_page_head() {
    let index = PageIndex::from_xml(
      r#"<page id="1" title="Q &amp; A"><page id="2" title="One"/><page id="3" title="Two"/></page>"#,
    )
    .unwrap();
    let page = index.resolve_by_id(1).unwrap();
    let html = render_page(
      page,
      &index.child_short_names(page),
      false,
      ContentFragment::from_html("<p>Body</p>"),
    );

    assert!(html.starts_with("<!DOCTYPE html>\n<html><head><title>Q &amp; A</title>"));
    assert!(html.contains(r#"<meta content="q-a" name="page-shortname">"#)
      || html.contains(r#"<meta name="page-shortname" content="q-a">"#));
    assert!(html.contains("q-a.html"));
    let one = html.find(r#""one""#).unwrap();
    let two = html.find(r#""two""#).unwrap();
    assert!(one < two);
    assert!(html.contains("<body><p>Body</p></body></html>"));
    assert!(!html.contains(r#""toc""#));
  }

  #[test]
  fn test_render_page_toc_meta() {
    let index = PageIndex::from_xml(r#"<page id="1" title="Home"/>"#).unwrap();
    let page = index.resolve_by_id(1).unwrap();
    let html = render_page(
      page,
      &[],
      true,
      ContentFragment::from_html("<p>toc::[]</p>"),
    );
    assert!(html.contains(r#"<meta name="toc" content="true">"#)
      || html.contains(r#"<meta content="true" name="toc">"#));
  }

  #[test]
  fn test_write_new_refuses_existing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");

    write_new(&path, "first").unwrap();
    assert!(matches!(
      write_new(&path, "second"),
      Err(WikiscrapeError::OutputExists(ref p)) if p == &path
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "first");
  }
}

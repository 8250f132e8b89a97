//! Manifest (`page-tree.xml`) parsing.
//!
//! Only `page` elements matter; any wrapper elements around them are
//! ignored. Nesting in the XML is the parent/child relation, so the tree
//! cannot contain a cycle unless an id is repeated, and repeated ids are
//! rejected when the page is inserted.
use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use super::{PageId, PageIndex};
use crate::error::IndexError;

const PAGE_TAG: &[u8] = b"page";

pub(super) fn parse(xml: &str) -> Result<PageIndex, IndexError> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut index = PageIndex::default();
  // slots of the currently open <page> elements
  let mut open: Vec<usize> = Vec::new();

  loop {
    let event = reader.read_event().map_err(|source| {
      IndexError::Xml {
        position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
        source,
      }
    })?;
    match event {
      Event::Start(ref e) if e.name().as_ref() == PAGE_TAG => {
        let slot = insert_page(&mut index, e, open.last().copied())?;
        open.push(slot);
      },
      Event::Empty(ref e) if e.name().as_ref() == PAGE_TAG => {
        insert_page(&mut index, e, open.last().copied())?;
      },
      Event::End(ref e) if e.name().as_ref() == PAGE_TAG => {
        open.pop();
      },
      Event::Eof => break,
      _ => {},
    }
  }

  Ok(index)
}

fn insert_page(
  index: &mut PageIndex,
  element: &BytesStart<'_>,
  parent: Option<usize>,
) -> Result<usize, IndexError> {
  let id = attribute(element, "id")?;
  let id = id
    .trim()
    .parse::<PageId>()
    .map_err(|_| IndexError::InvalidId(id.clone()))?;
  let title = attribute(element, "title")?;
  index.insert(id, &title, parent)
}

fn attribute(
  element: &BytesStart<'_>,
  name: &'static str,
) -> Result<String, IndexError> {
  let xml_error = |source: quick_xml::Error| {
    IndexError::Xml {
      position: 0,
      source,
    }
  };
  let attr = element
    .try_get_attribute(name)
    .map_err(|e| xml_error(e.into()))?
    .ok_or(IndexError::MissingAttribute(name))?;
  let value = attr.unescape_value().map_err(xml_error)?;
  Ok(value.into_owned())
}

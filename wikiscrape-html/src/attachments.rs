//! Image attachments: copy each one into a per-owner directory and point the
//! `img` at the copy.
use std::{
  collections::HashSet,
  fs,
  path::{Path, PathBuf},
};

use kuchikikiki::NodeRef;
use percent_encoding::percent_decode_str;

use crate::{
  ContentFragment,
  dom::{attr, elements_named, set_attr},
  error::{IndexError, ScrapeError},
  index::{PageId, PageIndex},
  types::AttachmentRef,
};

/// Attribute holding the id of the page that owns the attachment.
pub const OWNER_ATTR: &str = "data-linked-resource-container-id";

/// Attribute holding the attachment's stored file name.
pub const ALIAS_ATTR: &str = "data-linked-resource-default-alias";

/// Copies attachments referenced by pages into the images root.
///
/// A resolver is meant to live for a whole run: it remembers every
/// `(owner, file)` pair it has placed, so pages sharing an attachment only
/// cause one copy.
#[derive(Debug)]
pub struct AttachmentResolver<'a> {
  index:       &'a PageIndex,
  images_root: PathBuf,
  placed:      HashSet<(String, String)>,
  copies:      usize,
}

impl<'a> AttachmentResolver<'a> {
  #[must_use]
  pub fn new(index: &'a PageIndex, images_root: impl Into<PathBuf>) -> Self {
    Self {
      index,
      images_root: images_root.into(),
      placed: HashSet::new(),
      copies: 0,
    }
  }

  /// Number of files actually copied so far.
  #[must_use]
  pub const fn copies(&self) -> usize {
    self.copies
  }

  #[must_use]
  pub fn images_root(&self) -> &Path {
    &self.images_root
  }

  /// Describe the attachment an `img` refers to.
  ///
  /// Returns `Ok(None)` for images that are not tracked attachments.
  ///
  /// # Errors
  ///
  /// Returns an error if the owning page id is invalid or not in the index.
  pub fn attachment_for(
    &self,
    img: &NodeRef,
    page_dir: &Path,
  ) -> Result<Option<AttachmentRef>, ScrapeError> {
    let (Some(owner), Some(alias)) = (attr(img, OWNER_ATTR), attr(img, ALIAS_ATTR))
    else {
      return Ok(None);
    };
    let Some(src) = attr(img, "src") else {
      log::warn!("Attachment image '{alias}' has no src, skipping");
      return Ok(None);
    };

    let owner_id = owner
      .trim()
      .parse::<PageId>()
      .map_err(|_| IndexError::InvalidId(owner.clone()))?;
    let owner = self.index.resolve_by_id(owner_id)?;

    let Some(file_name) = Path::new(&alias)
      .file_name()
      .and_then(|name| name.to_str())
      .map(str::to_string)
    else {
      log::warn!("Attachment alias '{alias}' is not a file name, skipping");
      return Ok(None);
    };

    let src = src.split_once('?').map_or(src.as_str(), |(path, _)| path);
    let source_path =
      page_dir.join(percent_decode_str(src).decode_utf8_lossy().as_ref());

    Ok(Some(AttachmentRef {
      owner_short_name: owner.short_name.clone(),
      file_name,
      source_path,
    }))
  }

  /// Place one attachment under the images root, unless it already is.
  ///
  /// # Errors
  ///
  /// Returns an error if the source file is missing or the copy fails.
  pub fn place(
    &mut self,
    attachment: &AttachmentRef,
    page: &str,
  ) -> Result<(), ScrapeError> {
    let key = (
      attachment.owner_short_name.clone(),
      attachment.file_name.clone(),
    );
    if self.placed.contains(&key) {
      return Ok(());
    }

    let destination = self
      .images_root
      .join(&attachment.owner_short_name)
      .join(&attachment.file_name);
    if destination.exists() {
      log::debug!("{} already present", destination.display());
    } else {
      if !attachment.source_path.is_file() {
        return Err(ScrapeError::MissingAttachment {
          page:        page.to_string(),
          source_path: attachment.source_path.clone(),
        });
      }
      if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::copy(&attachment.source_path, &destination)?;
      self.copies += 1;
      log::debug!(
        "Copied {} to {}",
        attachment.source_path.display(),
        destination.display()
      );
    }

    self.placed.insert(key);
    Ok(())
  }

  /// Place every attachment image of a fragment and rewrite its `src`.
  ///
  /// `page_dir` is the directory the page was read from; image sources are
  /// relative to it.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown owner pages and missing source files.
  pub fn resolve(
    &mut self,
    fragment: ContentFragment,
    page_dir: &Path,
    page: &str,
  ) -> Result<ContentFragment, ScrapeError> {
    for img in elements_named(fragment.root(), &["img"]) {
      let Some(attachment) = self.attachment_for(&img, page_dir)? else {
        continue;
      };
      self.place(&attachment, page)?;
      set_attr(&img, "src", &attachment.relative_location());
    }
    Ok(fragment)
  }
}

//! Types shared by the conversion stages.

/// Record of an element identifier that had to be normalized.
///
/// Informational: the same information is left in the output as a visible
/// marker, nothing downstream consumes these records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRewrite {
  pub old_id: String,
  pub new_id: String,
}

/// Where a hyperlink points once resolved against the page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
  /// An absolute URL, possibly substituted by an external documentation
  /// reference.
  Absolute(String),

  /// An anchor within the current page.
  SameDocumentFragment(String),

  /// An anchor within another page of the manifest.
  CrossPage {
    short_name: String,
    fragment:   String,
  },

  /// A relative link that names no known page. Kept, marker-prefixed, so it
  /// can be found in the output.
  Unresolved(String),

  /// A link that is not a valid URI reference. Left exactly as it was.
  Malformed(String),
}

impl LinkTarget {
  /// Render the target as an `href` value.
  ///
  /// Relative targets carry `marker` so a later textual pass can convert
  /// them into the target markup's native cross-reference syntax.
  #[must_use]
  pub fn to_href(&self, marker: &str, extension: &str) -> String {
    match self {
      Self::Absolute(url) | Self::Malformed(url) => url.clone(),
      Self::SameDocumentFragment(fragment) => format!("{marker}#{fragment}"),
      Self::CrossPage {
        short_name,
        fragment,
      } => format!("{marker}{short_name}.{extension}#{fragment}"),
      Self::Unresolved(href) => format!("{marker}{href}"),
    }
  }

  /// Whether the target points into the converted document tree.
  #[must_use]
  pub const fn is_resolved_relative(&self) -> bool {
    matches!(self, Self::SameDocumentFragment(_) | Self::CrossPage { .. })
  }
}

/// An image attachment owned by a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentRef {
  pub owner_short_name: String,
  pub file_name:        String,
  pub source_path:      std::path::PathBuf,
}

impl AttachmentRef {
  /// Path of the attachment relative to the images root.
  #[must_use]
  pub fn relative_location(&self) -> String {
    format!("{}/{}", self.owner_short_name, self.file_name)
  }
}

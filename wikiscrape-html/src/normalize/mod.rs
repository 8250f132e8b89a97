//! Content normalization: rewriting an exported page body into the small HTML
//! dialect that survives conversion to `AsciiDoc`.
//!
//! # Pass order
//!
//! The passes in [`PASSES`] run strictly in order. Later passes rely on what
//! earlier ones guarantee, for example:
//!
//! - [`Pass::UnwrapCosmetic`] runs before [`Pass::InvertCodeLinks`], so a link
//!   wrapped in a `span.nolink` inside `code` is seen as the sole child.
//! - [`Pass::RelocateWhitespace`] runs before [`Pass::InvertCodeLinks`], so
//!   padding around the link does not count as a sibling.
//! - [`Pass::HeadingAnchors`] runs before [`Pass::NormalizeIds`], so ids are
//!   cleaned after they have been moved to their final element.
//! - [`Pass::Admonitions`] runs before [`Pass::UnwrapBlocks`], because it
//!   needs the callout `div` that the latter removes.
//!
//! Only [`Pass::Toc`] and [`Pass::Admonitions`] can fail; both signal a page
//! shape nobody has classified yet, which has to abort the whole run.
mod admonition;
mod anchors;
mod code;
mod inline;
mod structure;
mod toc;

use crate::{
  ContentFragment,
  error::ScrapeError,
  policy::ConversionPolicy,
  types::IdRewrite,
};

/// Text of the marker placed before lists that contain nested lists.
pub const NESTED_LIST_MARKER: &str =
  "REVIEW: nested list, check the converted output by hand";

/// Text of the marker placed before tables with block content in cells.
pub const BLOCK_TABLE_MARKER: &str =
  "REVIEW: table cells with block content, check the converted output by hand";

/// One rewrite rule of the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
  Toc,
  UnwrapEmpty,
  UnwrapCosmetic,
  RelocateWhitespace,
  FlattenCode,
  CodeEmphasis,
  InvertCodeLinks,
  StripStyle,
  CodeLanguage,
  HeadingAnchors,
  Admonitions,
  UnwrapBlocks,
  RemoveBreaks,
  NormalizeIds,
  FlagShapes,
  StripLeadingSpans,
  ReportCodeMarkup,
}

/// The passes in the order they run.
pub const PASSES: [Pass; 17] = [
  Pass::Toc,
  Pass::UnwrapEmpty,
  Pass::UnwrapCosmetic,
  Pass::RelocateWhitespace,
  Pass::FlattenCode,
  Pass::CodeEmphasis,
  Pass::InvertCodeLinks,
  Pass::StripStyle,
  Pass::CodeLanguage,
  Pass::HeadingAnchors,
  Pass::Admonitions,
  Pass::UnwrapBlocks,
  Pass::RemoveBreaks,
  Pass::NormalizeIds,
  Pass::FlagShapes,
  Pass::StripLeadingSpans,
  Pass::ReportCodeMarkup,
];

/// State threaded through the passes for one page.
#[derive(Debug)]
pub struct PassContext<'a> {
  pub policy:      &'a ConversionPolicy,
  /// Page label used in diagnostics.
  pub page:        &'a str,
  pub id_rewrites: Vec<IdRewrite>,
  /// Set when a table of contents block was replaced.
  pub has_toc:     bool,
}

impl Pass {
  /// Short name used in logs.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Toc => "toc",
      Self::UnwrapEmpty => "unwrap-empty",
      Self::UnwrapCosmetic => "unwrap-cosmetic",
      Self::RelocateWhitespace => "relocate-whitespace",
      Self::FlattenCode => "flatten-code",
      Self::CodeEmphasis => "code-emphasis",
      Self::InvertCodeLinks => "invert-code-links",
      Self::StripStyle => "strip-style",
      Self::CodeLanguage => "code-language",
      Self::HeadingAnchors => "heading-anchors",
      Self::Admonitions => "admonitions",
      Self::UnwrapBlocks => "unwrap-blocks",
      Self::RemoveBreaks => "remove-breaks",
      Self::NormalizeIds => "normalize-ids",
      Self::FlagShapes => "flag-shapes",
      Self::StripLeadingSpans => "strip-leading-spans",
      Self::ReportCodeMarkup => "report-code-markup",
    }
  }

  /// Run this pass over a fragment.
  ///
  /// # Errors
  ///
  /// Only [`Pass::Toc`] and [`Pass::Admonitions`] return content errors; any
  /// pass may report an invalid built-in selector.
  pub fn apply(
    self,
    fragment: ContentFragment,
    ctx: &mut PassContext<'_>,
  ) -> Result<ContentFragment, ScrapeError> {
    match self {
      Self::Toc => toc::remove_toc(fragment, ctx),
      Self::UnwrapEmpty => inline::unwrap_empty(fragment),
      Self::UnwrapCosmetic => inline::unwrap_cosmetic(fragment, ctx),
      Self::RelocateWhitespace => inline::relocate_whitespace(fragment),
      Self::FlattenCode => code::flatten_nested(fragment),
      Self::CodeEmphasis => code::emphasis_to_literal(fragment),
      Self::InvertCodeLinks => code::invert_links(fragment),
      Self::StripStyle => structure::strip_styles(fragment),
      Self::CodeLanguage => code::normalize_language(fragment, ctx),
      Self::HeadingAnchors => anchors::reconcile_headings(fragment),
      Self::Admonitions => admonition::convert(fragment, ctx),
      Self::UnwrapBlocks => structure::unwrap_blocks(fragment),
      Self::RemoveBreaks => structure::remove_breaks(fragment),
      Self::NormalizeIds => anchors::normalize_ids(fragment, ctx),
      Self::FlagShapes => structure::flag_shapes(fragment, ctx),
      Self::StripLeadingSpans => structure::strip_leading_spans(fragment),
      Self::ReportCodeMarkup => code::report_markup(fragment, ctx),
    }
  }
}

/// Output of [`Normalizer::normalize`].
#[derive(Debug)]
pub struct Normalized {
  pub fragment:    ContentFragment,
  pub id_rewrites: Vec<IdRewrite>,
  /// Whether the page had a table of contents.
  pub has_toc:     bool,
}

/// Runs [`PASSES`] over page fragments.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
  policy: &'a ConversionPolicy,
}

impl<'a> Normalizer<'a> {
  #[must_use]
  pub const fn new(policy: &'a ConversionPolicy) -> Self {
    Self { policy }
  }

  /// Normalize one page body.
  ///
  /// # Errors
  ///
  /// Returns an error if the page has an unrecognised table of contents or an
  /// admonition with several titles.
  pub fn normalize(
    &self,
    fragment: ContentFragment,
    page: &str,
  ) -> Result<Normalized, ScrapeError> {
    self.run(fragment, page, &PASSES)
  }

  /// Run a subset of passes, in the order given.
  ///
  /// # Errors
  ///
  /// See [`Normalizer::normalize`].
  pub fn run(
    &self,
    mut fragment: ContentFragment,
    page: &str,
    passes: &[Pass],
  ) -> Result<Normalized, ScrapeError> {
    let mut ctx = PassContext {
      policy: self.policy,
      page,
      id_rewrites: Vec::new(),
      has_toc: false,
    };
    for pass in passes {
      log::trace!("{page}: running pass {}", pass.name());
      fragment = pass.apply(fragment, &mut ctx)?;
    }
    Ok(Normalized {
      fragment,
      id_rewrites: ctx.id_rewrites,
      has_toc: ctx.has_toc,
    })
  }
}

//! # wikiscrape-html
//!
//! Normalization of exported wiki pages into HTML that converts cleanly to
//! `AsciiDoc`, with page-tree aware link and attachment handling.
//!
//! ## Quick Start
//!
//! ```rust
//! use wikiscrape_html::{
//!   ContentFragment,
//!   ConversionPolicy,
//!   LinkResolver,
//!   Normalizer,
//!   PageIndex,
//! };
//!
//! let index = PageIndex::from_xml(
//!   r#"<page id="1" title="Home"><page id="42" title="Getting Started"/></page>"#,
//! )?;
//! let policy = ConversionPolicy::default();
//!
//! let fragment = ContentFragment::from_page(
//!   r#"<div id="main-content"><p>See <a href="Getting-Started_42.html">this</a>.</p></div>"#,
//!   "Home_1.html",
//! )?;
//! let normalized = Normalizer::new(&policy).normalize(fragment, "Home_1.html")?;
//! let (fragment, _) =
//!   LinkResolver::new(&index, &policy).resolve(normalized.fragment, "Home_1.html");
//!
//! assert!(fragment.to_html().contains("REL_LINK//getting-started.adoc#getting-started"));
//! # Ok::<(), wikiscrape_html::ScrapeError>(())
//! ```
//!
//! ## Stages
//!
//! - [`PageIndex`]: page identities from the manifest.
//! - [`Normalizer`]: the ordered rewrite passes in [`normalize::PASSES`].
//! - [`LinkResolver`]: hyperlink classification and rewriting.
//! - [`AttachmentResolver`]: image attachment placement.
//!
//! Each stage takes the [`ContentFragment`] by value and hands it back.

pub mod attachments;
pub mod dom;
mod error;
mod fragment;
pub mod index;
pub mod links;
pub mod normalize;
pub mod policy;
pub mod types;
pub mod utils;

pub use crate::{
  attachments::AttachmentResolver,
  error::{IndexError, ScrapeError},
  fragment::{ContentFragment, MAIN_CONTENT_ID},
  index::{Page, PageId, PageIndex},
  links::{LinkResolver, LinkSummary},
  normalize::{Normalized, Normalizer, PASSES, Pass},
  policy::ConversionPolicy,
  types::{AttachmentRef, IdRewrite, LinkTarget},
};

#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use tempfile::tempdir;
use wikiscrape_html::{
  AttachmentResolver,
  ContentFragment,
  ConversionPolicy,
  LinkResolver,
  Normalizer,
  PageIndex,
  ScrapeError,
};

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pages>
  <page id="1" title="Reference Guide">
    <page id="42" title="Getting Started!!">
      <page id="43" title="Installing"/>
    </page>
  </page>
</pages>"#;

fn page(body: &str) -> String {
  format!(
    r#"<!DOCTYPE html><html><head><title>x</title></head><body>
<div id="breadcrumb-section">Home</div>
<div id="main-content" class="wiki-content group">{body}</div>
<div id="footer">Generated</div></body></html>"#
  )
}

fn convert(body: &str) -> Result<String, ScrapeError> {
  let index = PageIndex::from_xml(MANIFEST).expect("Failed to index manifest");
  let policy = ConversionPolicy::default();
  let fragment = ContentFragment::from_page(&page(body), "Reference-Guide_1.html")?;
  let normalized =
    Normalizer::new(&policy).normalize(fragment, "Reference-Guide_1.html")?;
  let (fragment, _) = LinkResolver::new(&index, &policy)
    .resolve(normalized.fragment, "Reference-Guide_1.html");
  Ok(fragment.to_html())
}

#[test]
fn test_cross_page_link_uses_manifest_short_name() {
  let html = convert(r#"<p>Read <a href="42.html#setup">the setup</a>.</p>"#)
    .expect("Failed to convert page");
  assert!(html.contains(r#"<a href="REL_LINK//getting-started.adoc#setup">"#));
  assert!(!html.contains("breadcrumb"));
  assert!(!html.contains("footer"));
}

#[test]
fn test_code_link_inversion_and_self_links() {
  let html = convert(
    r##"<p><code><a href="https://solr.apache.org/">https://solr.apache.org/</a></code> and <code><a href="#cfg">config</a></code></p>"##,
  )
  .expect("Failed to convert page");
  assert!(html.contains(
    r#"<code><a href="https://solr.apache.org/">https://solr.apache.org/</a></code>"#
  ));
  assert!(html.contains(r#"<a href="REL_LINK//#cfg"><code>config</code></a>"#));
}

#[test]
fn test_bold_image_survives() {
  let html = convert(r#"<p><strong><img src="plain.png"></strong></p>"#)
    .expect("Failed to convert page");
  assert!(html.contains(r#"<strong><img src="plain.png"></strong>"#));
}

#[test]
fn test_unknown_toc_shape_aborts() {
  let err = convert(r#"<p><span class="toc-macro">toc</span></p>"#)
    .expect_err("Unknown TOC shape must fail");
  assert!(matches!(err, ScrapeError::TocShape { .. }));
}

#[test]
fn test_sidebar_toc_is_replaced_by_placeholder() {
  let html = convert(
    r#"<div data-type="aside"><div class="toc-macro"><ul><li>Intro</li></ul></div></div><p>Body</p><div class="toc-macro">stray</div>"#,
  )
  .expect("A recognised TOC shape must not abort");
  assert!(html.starts_with("<p>toc::[]</p><p>Body</p>"));
  assert!(!html.contains("Intro"));
}

#[test]
fn test_flagged_shapes_and_admonitions() {
  let html = convert(
    r#"<div class="confluence-information-macro confluence-information-macro-note"><span class="aui-icon"></span><div class="confluence-information-macro-body"><ul><li>a<ul><li>b</li></ul></li></ul></div></div>"#,
  )
  .expect("Failed to convert page");
  assert!(html.contains("<p>[IMPORTANT]</p>"));
  assert!(html.contains(wikiscrape_html::normalize::NESTED_LIST_MARKER));
  assert!(!html.contains("<div"));
}

#[test]
fn test_attachments_are_placed_once_across_pages() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input = temp_dir.path().join("input");
  let images = temp_dir.path().join("output/images");
  fs::create_dir_all(input.join("attachments/42/7"))
    .expect("Failed to create dir in test");
  fs::write(input.join("attachments/42/7/shot.png"), b"image")
    .expect("Failed to write attachment in test");

  let index = PageIndex::from_xml(MANIFEST).expect("Failed to index manifest");
  let policy = ConversionPolicy::default();
  let mut attachments = AttachmentResolver::new(&index, &images);

  let body = r#"<p><span class="confluence-embedded-file-wrapper"><img class="confluence-embedded-image" src="attachments/42/7/shot.png?api=v2" data-linked-resource-container-id="42" data-linked-resource-default-alias="shot.png"></span></p>"#;
  for name in ["Installing_43.html", "Getting-Started_42.html"] {
    let fragment =
      ContentFragment::from_page(&page(body), name).expect("Failed to parse page");
    let normalized = Normalizer::new(&policy)
      .normalize(fragment, name)
      .expect("Failed to normalize page");
    let fragment = attachments
      .resolve(normalized.fragment, &input, name)
      .expect("Failed to place attachments");
    assert!(fragment.to_html().contains(r#"src="getting-started/shot.png""#));
  }

  assert_eq!(attachments.copies(), 1);
  assert_eq!(
    fs::read(images.join("getting-started/shot.png"))
      .expect("Failed to read copied attachment"),
    b"image"
  );
}

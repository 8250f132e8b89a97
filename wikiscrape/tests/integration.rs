#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::Path};

use tempfile::tempdir;
use wikiscrape::{
  error::WikiscrapeError,
  utils::{
    check::{Problem, check_site},
    convert::convert,
    nav::{PDF_BODY_FILE, SIDEBAR_FILE, write_navigation},
  },
};
use wikiscrape_config::Config;
use wikiscrape_html::PageIndex;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pages>
  <page id="1" title="Reference Guide">
    <page id="42" title="Getting Started">
      <page id="43" title="Installing"/>
    </page>
  </page>
</pages>"#;

fn exported_page(body: &str) -> String {
  format!(
    r#"<!DOCTYPE html><html><head><title>Export</title></head><body>
<div id="breadcrumb-section">Home</div>
<div id="main-content" class="wiki-content group">{body}</div>
<div id="footer">Generated</div></body></html>"#
  )
}

fn write_export(input_dir: &Path) {
  fs::create_dir_all(input_dir.join("attachments/42/7"))
    .expect("Failed to create dir in test");
  fs::write(input_dir.join("page-tree.xml"), MANIFEST)
    .expect("Failed to write manifest in test");
  fs::write(input_dir.join("attachments/42/7/shot.png"), b"image")
    .expect("Failed to write attachment in test");
  fs::write(input_dir.join("index.html"), exported_page("<p>Landing</p>"))
    .expect("Failed to write index.html in test");
  fs::write(input_dir.join("notes.html"), exported_page("<p>Loose</p>"))
    .expect("Failed to write notes.html in test");
  fs::write(
    input_dir.join("Reference-Guide_1.html"),
    exported_page(r#"<div class="toc-macro"><ul><li>Welcome</li></ul></div><h1>Welcome</h1><p>See <a href="Getting-Started_42.html#setup">setup</a>.</p>"#),
  )
  .expect("Failed to write page in test");
  fs::write(
    input_dir.join("Getting-Started_42.html"),
    exported_page(
      r#"<h2 id="GettingStarted-Setup">Setup</h2><p><img src="attachments/42/7/shot.png" data-linked-resource-container-id="42" data-linked-resource-default-alias="shot.png"></p>"#,
    ),
  )
  .expect("Failed to write page in test");
}

#[test]
fn test_convert_export() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("input");
  let output_dir = temp_dir.path().join("output");
  write_export(&input_dir);

  let config = Config {
    input_dir: Some(input_dir),
    output_dir: output_dir.clone(),
    ..Default::default()
  };
  let summary = convert(&config).expect("Failed to convert export");
  assert_eq!(summary.pages, 2);
  assert_eq!(summary.skipped, 1);
  assert_eq!(summary.attachments, 1);

  let guide = fs::read_to_string(output_dir.join("reference-guide.html"))
    .expect("Failed to read converted page");
  assert!(guide.starts_with("<!DOCTYPE html>"));
  assert!(guide.contains("<title>Reference Guide</title>"));
  assert!(guide.contains(r#"href="REL_LINK//getting-started.adoc#setup""#));
  assert!(guide.contains(r#""getting-started""#));
  assert!(!guide.contains("breadcrumb"));
  assert!(guide.contains("<p>toc::[]</p>"));
  assert!(guide.contains(r#"name="toc""#));

  let started = fs::read_to_string(output_dir.join("getting-started.html"))
    .expect("Failed to read converted page");
  assert!(started.contains(r#"src="getting-started/shot.png""#));
  assert!(!started.contains(r#"name="toc""#));
  assert_eq!(
    fs::read(output_dir.join("images/getting-started/shot.png"))
      .expect("Failed to read copied attachment"),
    b"image"
  );
  assert!(!output_dir.join("index.html").exists());
}

#[test]
fn test_convert_refuses_to_overwrite() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("input");
  write_export(&input_dir);

  let config = Config {
    input_dir: Some(input_dir),
    output_dir: temp_dir.path().join("output"),
    ..Default::default()
  };
  convert(&config).expect("Failed to convert export");
  assert!(matches!(
    convert(&config),
    Err(WikiscrapeError::OutputExists(_))
  ));
}

#[test]
fn test_convert_skips_oversized_page_id() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("input");
  write_export(&input_dir);
  fs::write(
    input_dir.join("Release-Notes_99999999999999999999999.html"),
    exported_page("<p>Stray</p>"),
  )
  .expect("Failed to write page in test");

  let config = Config {
    input_dir: Some(input_dir),
    output_dir: temp_dir.path().join("output"),
    ..Default::default()
  };
  let summary = convert(&config).expect("Failed to convert export");
  assert_eq!(summary.pages, 2);
  assert_eq!(summary.skipped, 2);
}

#[test]
fn test_convert_requires_input_dir() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = Config {
    input_dir: Some(temp_dir.path().join("missing")),
    ..Default::default()
  };
  assert!(matches!(convert(&config), Err(WikiscrapeError::Config(_))));
}

fn built_page(body: &str) -> String {
  format!(
    r#"<html><body><div id="main-content"><div id="preamble"></div>{body}</div></body></html>"#
  )
}

#[test]
fn test_check_site_reports_problems() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let site = temp_dir.path();
  fs::write(
    site.join("a.html"),
    built_page(r##"<h2 id="setup">Setup</h2><a href="b.html#usage">ok</a><a href="b.html">bare</a><a href="">empty</a>"##),
  )
  .expect("Failed to write page in test");
  fs::write(
    site.join("b.html"),
    built_page(r#"<h2 id="setup">Setup</h2><h2 id="usage">Usage</h2><a href="https://solr.apache.org/">external</a>"#),
  )
  .expect("Failed to write page in test");

  let report = check_site(site).expect("Failed to check site");
  assert_eq!(report.pages, 2);
  assert_eq!(report.problems.len(), 3);
  assert!(matches!(report.problems[0], Problem::MissingFragment { .. }));
  assert!(matches!(report.problems[1], Problem::EmptyHref { .. }));
  assert!(matches!(
    report.problems[2],
    Problem::DuplicateId { ref id, ref files } if id == "setup" && files.len() == 2
  ));
}

#[test]
fn test_check_site_errors() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  assert!(matches!(
    check_site(temp_dir.path()),
    Err(WikiscrapeError::NoPages(_))
  ));

  fs::write(temp_dir.path().join("a.html"), "<html><body></body></html>")
    .expect("Failed to write page in test");
  assert!(matches!(
    check_site(temp_dir.path()),
    Err(WikiscrapeError::Scrape(_))
  ));
}

#[test]
fn test_write_navigation() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let data_dir = temp_dir.path().join("_data");
  let index = PageIndex::from_xml(MANIFEST).expect("Failed to index manifest");

  write_navigation(&index, None, &data_dir, "adoc", "6.2")
    .expect("Failed to write navigation");

  let body = fs::read_to_string(data_dir.join(PDF_BODY_FILE))
    .expect("Failed to read pdf body");
  assert_eq!(
    body,
    "include::../reference-guide.adoc[leveloffset=+0]\n\n\
     include::../getting-started.adoc[leveloffset=+0]\n\n\
     include::../installing.adoc[leveloffset=+1]\n\n"
  );

  let sidebar: serde_json::Value = serde_json::from_str(
    &fs::read_to_string(data_dir.join(SIDEBAR_FILE))
      .expect("Failed to read sidebar"),
  )
  .expect("Failed to parse sidebar");
  let entry = &sidebar["entries"][0];
  assert_eq!(entry["product"], "Reference Guide");
  assert_eq!(entry["version"], "6.2");
  assert_eq!(entry["folders"][0]["title"], "Getting Started");
  assert_eq!(
    entry["folders"][0]["folderitems"][0]["url"],
    "installing.html"
  );

  assert!(matches!(
    write_navigation(&index, None, &data_dir, "adoc", "6.2"),
    Err(WikiscrapeError::OutputExists(_))
  ));
}

//! Callout macros to delimited admonition blocks.
use kuchikikiki::NodeRef;

use super::PassContext;
use crate::{
  ContentFragment,
  dom::{classes, new_paragraph, outer_html, select_all},
  error::ScrapeError,
};

const CLASS_PREFIX: &str = "confluence-information-macro-";

const DELIMITER: &str = "====";

/// Admonition kind for a callout class suffix.
fn kind_for_suffix(suffix: &str) -> Option<&'static str> {
  match suffix {
    "information" => Some("NOTE"),
    "tip" => Some("TIP"),
    "note" => Some("IMPORTANT"),
    "warning" => Some("WARNING"),
    _ => None,
  }
}

fn kind_of(callout: &NodeRef) -> Option<&'static str> {
  classes(callout)
    .iter()
    .filter_map(|class| class.strip_prefix(CLASS_PREFIX))
    .find_map(kind_for_suffix)
}

pub(super) fn convert(
  fragment: ContentFragment,
  ctx: &PassContext<'_>,
) -> Result<ContentFragment, ScrapeError> {
  for callout in select_all(fragment.root(), ".confluence-information-macro")?
  {
    let titles = select_all(&callout, ".title")?;
    if titles.len() > 1 {
      return Err(ScrapeError::AdmonitionTitles {
        page:   ctx.page.to_string(),
        markup: outer_html(&callout),
      });
    }

    let Some(kind) = kind_of(&callout) else {
      log::warn!(
        "{}: unknown admonition class '{}', leaving block undelimited",
        ctx.page,
        classes(&callout).join(" ")
      );
      continue;
    };

    if let Some(title) = titles.first() {
      let text = title.text_contents();
      title.detach();
      callout.insert_before(new_paragraph(&format!(".{}", text.trim())));
    }
    callout.insert_before(new_paragraph(&format!("[{kind}]")));
    callout.insert_before(new_paragraph(DELIMITER));
    callout.insert_after(new_paragraph(DELIMITER));

    for icon in select_all(&callout, "span.aui-icon")? {
      icon.detach();
    }
  }
  Ok(fragment)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::policy::ConversionPolicy;

  fn run(html: &str) -> Result<String, ScrapeError> {
    let policy = ConversionPolicy::default();
    let ctx = PassContext {
      policy:      &policy,
      page:        "callouts_3.html",
      id_rewrites: Vec::new(),
      has_toc:     false,
    };
    convert(ContentFragment::from_html(html), &ctx).map(|f| f.to_html())
  }

  #[test]
  fn test_titled_warning() {
    let html = run(
      r#"<div class="confluence-information-macro confluence-information-macro-warning"><p class="title">Careful</p><span class="aui-icon aui-icon-small"></span><div class="confluence-information-macro-body"><p>Hot.</p></div></div>"#,
    )
    .unwrap();
    assert_eq!(
      html,
      r#"<p>.Careful</p><p>[WARNING]</p><p>====</p><div class="confluence-information-macro confluence-information-macro-warning"><div class="confluence-information-macro-body"><p>Hot.</p></div></div><p>====</p>"#
    );
  }

  #[test]
  fn test_kind_mapping() {
    for (suffix, kind) in [
      ("information", "NOTE"),
      ("tip", "TIP"),
      ("note", "IMPORTANT"),
      ("warning", "WARNING"),
    ] {
      let html = run(&format!(
        r#"<div class="confluence-information-macro confluence-information-macro-{suffix}"><p>x</p></div>"#
      ))
      .unwrap();
      assert!(html.starts_with(&format!("<p>[{kind}]</p><p>====</p>")), "{suffix}");
      assert!(html.ends_with("<p>====</p>"));
    }
  }

  #[test]
  fn test_unknown_kind_is_left_alone() {
    let input = r#"<div class="confluence-information-macro confluence-information-macro-fancy"><p class="title">T</p><p>x</p></div>"#;
    assert_eq!(run(input).unwrap(), input);
  }

  #[test]
  fn test_multiple_titles_are_fatal() {
    let err = run(
      r#"<div class="confluence-information-macro confluence-information-macro-tip"><p class="title">A</p><p class="title">B</p></div>"#,
    )
    .unwrap_err();
    assert!(matches!(
      err,
      ScrapeError::AdmonitionTitles { ref page, .. } if page == "callouts_3.html"
    ));
  }
}

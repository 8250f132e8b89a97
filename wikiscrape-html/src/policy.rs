//! Corpus-specific conversion policy.
//!
//! None of these heuristics are universal. They are the defaults that suit a
//! Confluence export of a reference guide being converted to `AsciiDoc`, and
//! every one of them can be replaced through configuration.

use std::collections::HashMap;

use regex::Regex;

use crate::utils::never_matching_regex;

/// Default textual prefix for rewritten relative links.
pub const DEFAULT_LINK_MARKER: &str = "REL_LINK//";

/// Default extension for cross-page link targets.
pub const DEFAULT_LINK_EXTENSION: &str = "adoc";

/// Default spans unwrapped unconditionally before code inspection.
pub const DEFAULT_COSMETIC_SPAN_CLASSES: [&str; 3] =
  ["nolink", "external-link", "confluence-embedded-file-wrapper"];

/// Rewrites an absolute link to an external API documentation site into a
/// cross-project attribute reference.
#[derive(Debug, Clone)]
pub struct ExternalDocRule {
  /// Host the link must point at.
  pub host:         String,
  /// Pattern the URL path must match in full. The first capture group, if
  /// any, is appended to the replacement.
  pub path_pattern: Regex,
  /// Replacement prefix, e.g. `{solr-javadocs}`.
  pub replacement:  String,
}

impl ExternalDocRule {
  /// # Errors
  ///
  /// Returns an error if `path_pattern` is not a valid regex.
  pub fn new(
    host: &str,
    path_pattern: &str,
    replacement: &str,
  ) -> Result<Self, regex::Error> {
    Ok(Self {
      host:         host.to_string(),
      path_pattern: Regex::new(path_pattern)?,
      replacement:  replacement.to_string(),
    })
  }

  /// Apply the rule to a parsed absolute URL.
  #[must_use]
  pub fn apply(&self, url: &url::Url) -> Option<String> {
    if url.host_str() != Some(self.host.as_str()) {
      return None;
    }
    let captures = self.path_pattern.captures(url.path())?;
    let whole = captures.get(0)?;
    if whole.start() != 0 || whole.end() != url.path().len() {
      return None;
    }
    let tail = captures.get(1).map_or("", |m| m.as_str());
    let mut out = format!("{}{tail}", self.replacement);
    if let Some(fragment) = url.fragment() {
      out.push('#');
      out.push_str(fragment);
    }
    Some(out)
  }
}

/// A rule forcing a code language when a block's text starts with a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedLanguage {
  pub prefix:   String,
  pub language: String,
}

/// How `pre` block language classes are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLanguagePolicy {
  /// Declared language → emitted language.
  pub remap:           HashMap<String, String>,
  /// Checked in order; the first matching prefix wins over any declared
  /// language.
  pub forced_prefixes: Vec<ForcedLanguage>,
}

impl Default for CodeLanguagePolicy {
  fn default() -> Self {
    Self {
      remap:           HashMap::from([
        ("html/xml".to_string(), "xml".to_string()),
        // `js` blocks hold JSON payloads
        ("js".to_string(), "json".to_string()),
      ]),
      forced_prefixes: vec![ForcedLanguage {
        prefix:   "curl ".to_string(),
        language: "bash".to_string(),
      }],
    }
  }
}

impl CodeLanguagePolicy {
  /// Decide the language for a block given its declared language (if any)
  /// and its text.
  #[must_use]
  pub fn language_for(
    &self,
    declared: Option<&str>,
    text: &str,
  ) -> Option<String> {
    if let Some(forced) = self
      .forced_prefixes
      .iter()
      .find(|rule| text.starts_with(&rule.prefix))
    {
      return Some(forced.language.clone());
    }
    declared.map(|lang| {
      self
        .remap
        .get(lang)
        .cloned()
        .unwrap_or_else(|| lang.to_string())
    })
  }
}

/// Everything the conversion passes need to know about the corpus.
#[derive(Debug, Clone)]
pub struct ConversionPolicy {
  pub link_marker:           String,
  pub link_extension:        String,
  pub cosmetic_span_classes: Vec<String>,
  pub code_language:         CodeLanguagePolicy,
  pub external_doc_rules:    Vec<ExternalDocRule>,
}

impl Default for ConversionPolicy {
  fn default() -> Self {
    Self {
      link_marker:           DEFAULT_LINK_MARKER.to_string(),
      link_extension:        DEFAULT_LINK_EXTENSION.to_string(),
      cosmetic_span_classes: DEFAULT_COSMETIC_SPAN_CLASSES
        .iter()
        .map(|class| (*class).to_string())
        .collect(),
      code_language:         CodeLanguagePolicy::default(),
      external_doc_rules:    default_external_doc_rules(),
    }
  }
}

/// `(host, path pattern, replacement)` for the built-in javadoc rules.
pub const DEFAULT_EXTERNAL_DOC_RULES: [(&str, &str, &str); 2] = [
  (
    "lucene.apache.org",
    r"/core/\d+_\d+_\d+(/.*)",
    "{lucene-javadocs}",
  ),
  ("lucene.apache.org", r"/solr/\d+_\d+_\d+(/.*)", "{solr-javadocs}"),
];

fn default_external_doc_rules() -> Vec<ExternalDocRule> {
  DEFAULT_EXTERNAL_DOC_RULES
    .iter()
    .map(|(host, pattern, replacement)| {
      ExternalDocRule::new(host, pattern, replacement).unwrap_or_else(|e| {
        log::error!("Failed to compile built-in external doc rule: {e}");
        ExternalDocRule {
          host:         (*host).to_string(),
          path_pattern: never_matching_regex(),
          replacement:  (*replacement).to_string(),
        }
      })
    })
    .collect()
}

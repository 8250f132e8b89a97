use std::sync::LazyLock;

use regex::Regex;

/// Returns a regex that can never match any input.
///
/// Used as a fallback when a static pattern fails to compile, so callers keep
/// running and the failure is visible in the logs instead of panicking.
#[must_use]
#[allow(
  clippy::unwrap_used,
  reason = "Constant pattern, only reached if the first one is rejected"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| Regex::new(r"^\b$").unwrap())
}

/// Compile a static pattern, logging and degrading to
/// [`never_matching_regex`] on failure.
pub(crate) fn static_regex(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}

static NON_ID_CHARS: LazyLock<Regex> =
  LazyLock::new(|| static_regex("NON_ID_CHARS", r"[^A-Za-z0-9._\-#]+"));

/// Restrict an element identifier to `[A-Za-z0-9._-#]`.
///
/// Every run of other characters becomes a single `_`. The function is
/// idempotent: its output only contains characters it leaves untouched.
///
/// ```
/// use wikiscrape_html::utils::clean_id;
///
/// assert_eq!(clean_id("My Id #1"), "My_Id_#1");
/// assert_eq!(clean_id(&clean_id("My Id #1")), "My_Id_#1");
/// ```
#[must_use]
pub fn clean_id(id: &str) -> String {
  NON_ID_CHARS.replace_all(id, "_").into_owned()
}

/// Whether a string is empty or consists only of whitespace.
#[must_use]
pub fn is_blank(text: &str) -> bool {
  text.chars().all(char::is_whitespace)
}

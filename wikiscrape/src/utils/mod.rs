pub mod check;
pub mod convert;
pub mod nav;
pub mod output;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::WikiscrapeError;

/// Collect the `*.html` files directly inside `dir`, sorted by name.
///
/// # Errors
///
/// Returns an error if `dir` itself cannot be read. Unreadable entries inside
/// it are logged and skipped.
pub fn collect_html_files(dir: &Path) -> Result<Vec<PathBuf>, WikiscrapeError> {
  let mut files = Vec::new();

  for result in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name()
  {
    let entry = match result {
      Ok(entry) => entry,
      Err(e) if e.depth() == 0 => {
        return Err(WikiscrapeError::Read {
          path:   dir.to_path_buf(),
          source: e.into(),
        });
      },
      Err(e) => {
        log::warn!("Skipping unreadable directory entry: {e}");
        continue;
      },
    };
    let path = entry.path();
    if entry.file_type().is_file()
      && path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
      files.push(path.to_path_buf());
    }
  }

  log::trace!("Found {} HTML files in {}", files.len(), dir.display());
  Ok(files)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::fs;

  use super::*;

  #[test]
  fn test_collect_html_files_is_flat_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b_2.html"), "").unwrap();
    fs::write(dir.path().join("a_1.HTML"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/c_3.html"), "").unwrap();

    let names: Vec<_> = collect_html_files(dir.path())
      .unwrap()
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["a_1.HTML", "b_2.html"]);
  }

  #[test]
  fn test_collect_html_files_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      collect_html_files(&dir.path().join("missing")),
      Err(WikiscrapeError::Read { .. })
    ));
  }
}

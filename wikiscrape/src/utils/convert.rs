use std::{
  fs,
  path::{Path, PathBuf},
};

use wikiscrape_config::{Config, ConfigError};
use wikiscrape_html::{
  AttachmentResolver,
  ContentFragment,
  ConversionPolicy,
  LinkResolver,
  Normalizer,
  Page,
  PageIndex,
};

use crate::{
  error::WikiscrapeError,
  utils::{collect_html_files, output},
};

/// Export landing page that is never part of the page tree.
pub const SENTINEL_PAGE: &str = "index.html";

/// What a conversion run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
  pub pages:            usize,
  pub skipped:          usize,
  pub attachments:      usize,
  pub unresolved_links: usize,
  pub id_rewrites:      usize,
}

/// Everything shared by the pages of one run.
struct Converter<'a> {
  config:      &'a Config,
  input_dir:   &'a Path,
  index:       &'a PageIndex,
  policy:      &'a ConversionPolicy,
  attachments: AttachmentResolver<'a>,
  summary:     ConvertSummary,
}

impl Converter<'_> {
  fn output_path(&self, page: &Page) -> PathBuf {
    self
      .config
      .output_dir
      .join(format!("{}.{}", page.short_name, self.config.output_extension))
  }

  fn convert_page(
    &mut self,
    path: &Path,
    file_name: &str,
    page: &Page,
  ) -> Result<(), WikiscrapeError> {
    log::debug!("Converting {file_name} as '{}'", page.short_name);
    let html = fs::read_to_string(path).map_err(|source| {
      WikiscrapeError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let fragment = ContentFragment::from_page(&html, file_name)?;
    let normalized = Normalizer::new(self.policy).normalize(fragment, file_name)?;
    let (fragment, links) = LinkResolver::new(self.index, self.policy)
      .resolve(normalized.fragment, file_name);
    let fragment = self
      .attachments
      .resolve(fragment, self.input_dir, file_name)?;

    let children = self.index.child_short_names(page);
    let document =
      output::render_page(page, &children, normalized.has_toc, fragment);
    output::write_new(&self.output_path(page), &document)?;

    self.summary.pages += 1;
    self.summary.unresolved_links += links.unresolved;
    self.summary.id_rewrites += normalized.id_rewrites.len();
    Ok(())
  }
}

/// Convert every page of the export described by `config`.
///
/// Pages are handled one at a time, in file name order. The first fatal
/// problem stops the run; pages written before it stay on disk.
///
/// # Errors
///
/// Returns an error for invalid paths, a broken manifest, any fatal content
/// problem, or an output file that already exists.
pub fn convert(config: &Config) -> Result<ConvertSummary, WikiscrapeError> {
  config.validate_paths()?;
  let input_dir = config.input_dir.as_deref().ok_or_else(|| {
    ConfigError::Config("No input directory configured".to_string())
  })?;
  let manifest = config.manifest_path().ok_or_else(|| {
    ConfigError::Config("No manifest configured".to_string())
  })?;

  let index = PageIndex::from_file(&manifest)?;
  log::info!("Loaded {} pages from {}", index.len(), manifest.display());
  let policy = config.policy()?;

  fs::create_dir_all(&config.output_dir)?;
  log::info!("Output directory: {}", config.output_dir.display());

  let mut converter = Converter {
    config,
    input_dir,
    index: &index,
    policy: &policy,
    attachments: AttachmentResolver::new(&index, config.images_path()),
    summary: ConvertSummary::default(),
  };

  for path in collect_html_files(input_dir)? {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str())
    else {
      log::warn!("Skipping file with a non UTF-8 name: {}", path.display());
      converter.summary.skipped += 1;
      continue;
    };
    if file_name == SENTINEL_PAGE {
      log::debug!("Skipping {SENTINEL_PAGE}");
      continue;
    }
    let Some(page) = index.resolve_by_source_path(file_name)? else {
      log::warn!("Skipping {file_name}: no page id in file name");
      converter.summary.skipped += 1;
      continue;
    };
    converter.convert_page(&path, file_name, page)?;
  }

  converter.summary.attachments = converter.attachments.copies();
  Ok(converter.summary)
}

use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use wikiscrape_html::policy::{
  CodeLanguagePolicy,
  ConversionPolicy,
  DEFAULT_COSMETIC_SPAN_CLASSES,
  DEFAULT_EXTERNAL_DOC_RULES,
  DEFAULT_LINK_EXTENSION,
  DEFAULT_LINK_MARKER,
  ExternalDocRule,
  ForcedLanguage,
};

use crate::error::ConfigError;

/// Manifest file name looked up in the input directory when none is given.
pub const DEFAULT_MANIFEST_NAME: &str = "page-tree.xml";

/// Configuration for the wikiscrape converter.
///
/// Fields are typically loaded from a TOML or JSON config file, and can be
/// overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory holding the exported `*.html` pages.
  pub input_dir: Option<PathBuf>,

  /// Page tree manifest. Defaults to `page-tree.xml` in the input directory.
  pub manifest: Option<PathBuf>,

  /// Directory converted pages are written to.
  pub output_dir: PathBuf,

  /// Root directory for attachments. Defaults to `<output_dir>/images`.
  pub images_dir: Option<PathBuf>,

  /// Prefix marking rewritten relative links.
  pub link_marker: String,

  /// Extension used for cross-page link targets.
  pub link_extension: String,

  /// Extension of the written page files.
  pub output_extension: String,

  /// Span classes that are unwrapped unconditionally.
  pub cosmetic_span_classes: Vec<String>,

  /// Code block language handling.
  pub code_language: CodeLanguageConfig,

  /// Absolute links rewritten to external documentation references.
  pub external_doc_rules: Vec<ExternalDocRuleConfig>,

  /// Short name of the page navigation starts from. Defaults to the first
  /// top-level page of the manifest.
  pub root_page: Option<String>,

  /// Version string written into the sidebar data.
  pub sidebar_version: String,
}

/// Code block language configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeLanguageConfig {
  /// Declared language to emitted language.
  pub remap:           HashMap<String, String>,
  /// Text prefixes forcing a language, checked in order.
  pub forced_prefixes: Vec<ForcedPrefixConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedPrefixConfig {
  pub prefix:   String,
  pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocRuleConfig {
  pub host:         String,
  /// Regular expression the whole URL path has to match.
  pub path_pattern: String,
  pub replacement:  String,
}

impl Default for CodeLanguageConfig {
  fn default() -> Self {
    let defaults = CodeLanguagePolicy::default();
    let forced_prefixes = defaults
      .forced_prefixes
      .into_iter()
      .map(|rule| {
        ForcedPrefixConfig {
          prefix:   rule.prefix,
          language: rule.language,
        }
      })
      .collect();
    Self {
      remap: defaults.remap,
      forced_prefixes,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:             None,
      manifest:              None,
      output_dir:            PathBuf::from("build"),
      images_dir:            None,
      link_marker:           DEFAULT_LINK_MARKER.to_string(),
      link_extension:        DEFAULT_LINK_EXTENSION.to_string(),
      output_extension:      "html".to_string(),
      cosmetic_span_classes: DEFAULT_COSMETIC_SPAN_CLASSES
        .iter()
        .map(|class| (*class).to_string())
        .collect(),
      code_language:         CodeLanguageConfig::default(),
      external_doc_rules:    DEFAULT_EXTERNAL_DOC_RULES
        .iter()
        .map(|(host, path_pattern, replacement)| {
          ExternalDocRuleConfig {
            host:         (*host).to_string(),
            path_pattern: (*path_pattern).to_string(),
            replacement:  (*replacement).to_string(),
          }
        })
        .collect(),
      root_page:             None,
      sidebar_version:       String::new(),
    }
  }
}

/// Append the entries of `other` missing from `base`.
fn extend_unique<T: PartialEq>(base: &mut Vec<T>, other: Vec<T>) {
  for item in other {
    if !base.contains(&item) {
      base.push(item);
    }
  }
}

fn parse_optional_path(value: &str) -> Option<PathBuf> {
  (!value.is_empty()).then(|| PathBuf::from(value))
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match extension.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Serde {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from the given files (merged in order), or from a
  /// discovered config file, then apply `KEY=VALUE` overrides and validate.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is invalid, or
  /// the resulting configuration does not validate.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }
      if !rest.is_empty() {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: other's [`Some`] value replaces this one
  /// - [`Vec<T>`] fields: other's entries not already present are appended
  /// - [`HashMap`] fields: other's entries are merged in
  /// - Plain fields: other's value replaces this one
  ///
  /// Fields of `other` still at their default value are skipped, so a file
  /// that does not mention a field leaves it alone.
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();

    if other.input_dir.is_some() {
      self.input_dir = other.input_dir;
    }
    if other.manifest.is_some() {
      self.manifest = other.manifest;
    }
    if other.images_dir.is_some() {
      self.images_dir = other.images_dir;
    }
    if other.root_page.is_some() {
      self.root_page = other.root_page;
    }

    if other.output_dir != defaults.output_dir {
      self.output_dir = other.output_dir;
    }
    if other.link_marker != defaults.link_marker {
      self.link_marker = other.link_marker;
    }
    if other.link_extension != defaults.link_extension {
      self.link_extension = other.link_extension;
    }
    if other.output_extension != defaults.output_extension {
      self.output_extension = other.output_extension;
    }
    if other.sidebar_version != defaults.sidebar_version {
      self.sidebar_version = other.sidebar_version;
    }

    if other.cosmetic_span_classes != defaults.cosmetic_span_classes {
      extend_unique(
        &mut self.cosmetic_span_classes,
        other.cosmetic_span_classes,
      );
    }
    if other.external_doc_rules != defaults.external_doc_rules {
      extend_unique(&mut self.external_doc_rules, other.external_doc_rules);
    }
    if other.code_language != defaults.code_language {
      self.code_language.remap.extend(other.code_language.remap);
      extend_unique(
        &mut self.code_language.forced_prefixes,
        other.code_language.forced_prefixes,
      );
    }
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format or names an
  /// unknown key.
  ///
  /// # Example
  ///
  /// ```rust
  /// use wikiscrape_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "output_dir=out".to_string(),
  ///     "code_language.remap.sh=bash".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert_eq!(config.code_language.remap["sh"], "bash");
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "input_dir" => self.input_dir = parse_optional_path(value),
      "manifest" => self.manifest = parse_optional_path(value),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "images_dir" => self.images_dir = parse_optional_path(value),
      "link_marker" => self.link_marker = value.to_string(),
      "link_extension" => self.link_extension = value.to_string(),
      "output_extension" => self.output_extension = value.to_string(),
      "root_page" => {
        self.root_page = (!value.is_empty()).then(|| value.to_string());
      },
      "sidebar_version" => self.sidebar_version = value.to_string(),
      "cosmetic_span_classes" => {
        self.cosmetic_span_classes = value
          .split(',')
          .map(str::trim)
          .filter(|class| !class.is_empty())
          .map(str::to_string)
          .collect();
      },
      _ => {
        let Some(language) = key.strip_prefix("code_language.remap.") else {
          return Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'"
          )));
        };
        if value.is_empty() {
          self.code_language.remap.remove(language);
        } else {
          self
            .code_language
            .remap
            .insert(language.to_string(), value.to_string());
        }
      },
    }
    log::debug!("Config override: {key}={value}");
    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        for filename in [
          "wikiscrape.toml",
          "wikiscrape.json",
          ".config/wikiscrape.toml",
          ".config/wikiscrape.json",
        ] {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("wikiscrape");
          for filename in ["config.toml", "config.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Check the configuration for values that would make a run meaningless.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.link_marker.is_empty() {
      errors.push("link_marker must not be empty".to_string());
    }
    if self.link_extension.is_empty() {
      errors.push("link_extension must not be empty".to_string());
    }
    if self.output_extension.is_empty() {
      errors.push("output_extension must not be empty".to_string());
    }
    for rule in &self.external_doc_rules {
      if let Err(e) = regex::Regex::new(&rule.path_pattern) {
        errors.push(format!(
          "Invalid path_pattern for host {}: {e}",
          rule.host
        ));
      }
    }

    if !errors.is_empty() {
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{}",
        errors.join("\n")
      )));
    }
    Ok(())
  }

  /// Check that the paths a conversion reads from exist.
  ///
  /// # Errors
  ///
  /// Returns an error if the input directory is missing or not a directory,
  /// or the manifest is not a file.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    match self.input_dir {
      None => errors.push("No input directory configured".to_string()),
      Some(ref input_dir) if !input_dir.is_dir() => {
        errors.push(format!(
          "Input directory does not exist or is not a directory: {}",
          input_dir.display()
        ));
      },
      Some(_) => {},
    }

    if let Some(manifest) = self.manifest_path()
      && !manifest.is_file()
    {
      errors.push(format!(
        "Manifest file does not exist: {}",
        manifest.display()
      ));
    }

    if !errors.is_empty() {
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{}",
        errors.join("\n")
      )));
    }
    Ok(())
  }

  /// The manifest to read, if one can be determined.
  #[must_use]
  pub fn manifest_path(&self) -> Option<PathBuf> {
    self.manifest.clone().or_else(|| {
      self
        .input_dir
        .as_ref()
        .map(|dir| dir.join(DEFAULT_MANIFEST_NAME))
    })
  }

  /// Root directory attachments are copied into.
  #[must_use]
  pub fn images_path(&self) -> PathBuf {
    self
      .images_dir
      .clone()
      .unwrap_or_else(|| self.output_dir.join("images"))
  }

  /// Build the conversion policy the passes run with.
  ///
  /// # Errors
  ///
  /// Returns an error if an external documentation rule has an invalid
  /// pattern.
  pub fn policy(&self) -> Result<ConversionPolicy, ConfigError> {
    let external_doc_rules = self
      .external_doc_rules
      .iter()
      .map(|rule| {
        ExternalDocRule::new(&rule.host, &rule.path_pattern, &rule.replacement)
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(ConversionPolicy {
      link_marker: self.link_marker.clone(),
      link_extension: self.link_extension.clone(),
      cosmetic_span_classes: self.cosmetic_span_classes.clone(),
      code_language: CodeLanguagePolicy {
        remap:           self.code_language.remap.clone(),
        forced_prefixes: self
          .code_language
          .forced_prefixes
          .iter()
          .map(|rule| {
            ForcedLanguage {
              prefix:   rule.prefix.clone(),
              language: rule.language.clone(),
            }
          })
          .collect(),
      },
      external_doc_rules,
    })
  }
}

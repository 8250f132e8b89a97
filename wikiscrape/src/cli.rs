use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wikiscrape_config::Config;

/// Command line interface for wikiscrape
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Convert an exported wiki page tree into AsciiDoc-ready HTML"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the wikiscrape CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Convert every exported page into a normalized HTML document.
  Convert {
    /// Directory containing the exported pages.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Page tree manifest (defaults to page-tree.xml in the input directory).
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output directory for converted pages.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
  },

  /// Check a built site for broken anchors and duplicate ids.
  Check {
    /// Directory containing the built HTML pages.
    html_dir: PathBuf,
  },

  /// Write the PDF body include list and the sidebar data.
  Nav {
    /// Page tree manifest.
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Short name of the page to start from.
    #[arg(short, long)]
    root: Option<String>,

    /// Directory the navigation files are written to.
    data_dir: PathBuf,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

impl Commands {
  /// Let arguments given on the command line take precedence over the
  /// loaded configuration.
  pub fn merge_into(&self, config: &mut Config) {
    match self {
      Self::Convert {
        input_dir,
        manifest,
        output_dir,
      } => {
        if let Some(input_dir) = input_dir {
          config.input_dir = Some(input_dir.clone());
        }
        if let Some(manifest) = manifest {
          config.manifest = Some(manifest.clone());
        }
        if let Some(output_dir) = output_dir {
          config.output_dir.clone_from(output_dir);
        }
      },
      Self::Nav { manifest, root, .. } => {
        if let Some(manifest) = manifest {
          config.manifest = Some(manifest.clone());
        }
        if let Some(root) = root {
          config.root_page = Some(root.clone());
        }
      },
      Self::Check { .. } => {},
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cli_args_override_config() {
    let cli = Cli::parse_from([
      "wikiscrape",
      "--config",
      "link_marker=X",
      "convert",
      "--input-dir",
      "export",
      "-o",
      "site",
      "-v",
    ]);
    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, vec!["link_marker=X"]);

    let mut config = Config {
      input_dir: Some(PathBuf::from("from-file")),
      ..Default::default()
    };
    cli.command.merge_into(&mut config);
    assert_eq!(config.input_dir, Some(PathBuf::from("export")));
    assert_eq!(config.output_dir, PathBuf::from("site"));
    assert_eq!(config.manifest, None);
  }

  #[test]
  fn test_nav_args() {
    let cli =
      Cli::parse_from(["wikiscrape", "nav", "--root", "guide", "out/_data"]);
    let mut config = Config::default();
    cli.command.merge_into(&mut config);
    assert_eq!(config.root_page.as_deref(), Some("guide"));
    assert!(matches!(
      cli.command,
      Commands::Nav { ref data_dir, .. } if data_dir == &PathBuf::from("out/_data")
    ));
  }
}

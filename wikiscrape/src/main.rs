use color_eyre::eyre::{Context, Result, eyre};
use log::{LevelFilter, error, info};
use wikiscrape::{
  cli::{Cli, Commands},
  error::WikiscrapeError,
  utils::{check, convert, nav},
};
use wikiscrape_config::Config;
use wikiscrape_html::PageIndex;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  cli.command.merge_into(&mut config);

  match &cli.command {
    Commands::Convert { .. } => run_convert(&config),
    Commands::Check { html_dir } => {
      let report = check::check_site(html_dir)?;
      for problem in &report.problems {
        error!("{problem}");
      }
      if !report.is_clean() {
        return Err(WikiscrapeError::CheckFailed(report.problems.len()).into());
      }
      info!("Checked {} pages, no problems found", report.pages);
      Ok(())
    },
    Commands::Nav { data_dir, .. } => {
      let manifest = config
        .manifest_path()
        .ok_or_else(|| eyre!("No manifest given; pass --manifest"))?;
      let index = PageIndex::from_file(&manifest).wrap_err_with(|| {
        format!("Failed to load manifest {}", manifest.display())
      })?;
      nav::write_navigation(
        &index,
        config.root_page.as_deref(),
        data_dir,
        &config.link_extension,
        &config.sidebar_version,
      )?;
      Ok(())
    },
  }
}

/// Run the conversion pipeline over the whole export.
fn run_convert(config: &Config) -> Result<()> {
  info!("Starting conversion...");
  let summary = convert::convert(config)?;
  info!(
    "Converted {} pages ({} skipped), copied {} attachments",
    summary.pages, summary.skipped, summary.attachments
  );
  if summary.unresolved_links > 0 {
    info!("{} links could not be resolved", summary.unresolved_links);
  }
  if summary.id_rewrites > 0 {
    info!("{} ids were rewritten", summary.id_rewrites);
  }
  info!(
    "Pages written successfully in {}",
    config.output_dir.display()
  );
  Ok(())
}

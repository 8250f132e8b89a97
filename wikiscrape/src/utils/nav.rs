use std::{fmt::Write as _, fs, path::Path};

use serde::Serialize;
use wikiscrape_html::{Page, PageIndex};

use crate::{error::WikiscrapeError, utils::output::write_new};

pub const PDF_BODY_FILE: &str = "pdf-main-body.adoc";
pub const SIDEBAR_FILE: &str = "sidebar.json";

/// Sidebars nest folders two levels deep; deeper pages are flattened into
/// the closest subfolder list.
const MAX_SIDEBAR_DEPTH: usize = 3;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Sidebar {
  pub entries: Vec<SidebarEntry>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SidebarEntry {
  pub title:   &'static str,
  pub version: String,
  pub product: String,
  pub url:     String,
  pub folders: Vec<Folder>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Folder {
  pub title:       String,
  pub url:         String,
  pub folderitems: Vec<FolderItem>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FolderItem {
  pub title:      String,
  pub url:        String,
  pub subfolders: Vec<NavLink>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NavLink {
  pub title: String,
  pub url:   String,
}

/// Pick the page navigation starts from.
///
/// # Errors
///
/// Returns an error if the named page does not exist, or if no name is
/// given and the manifest has no pages.
pub fn root_page<'a>(
  index: &'a PageIndex,
  short_name: Option<&str>,
) -> Result<&'a Page, WikiscrapeError> {
  match short_name {
    Some(name) => {
      index
        .resolve_by_short_name(name)
        .ok_or_else(|| WikiscrapeError::UnknownRoot(name.to_string()))
    },
    None => index.roots().next().ok_or(WikiscrapeError::EmptyManifest),
  }
}

/// Include list for the single-document PDF build, one page per include in
/// depth-first order.
#[must_use]
pub fn pdf_main_body(index: &PageIndex, root: &Page, extension: &str) -> String {
  let mut body = String::new();
  for (depth, page) in index.walk(root) {
    let offset = depth.saturating_sub(1);
    let _ = writeln!(
      body,
      "include::../{}.{extension}[leveloffset=+{offset}]\n",
      page.short_name
    );
  }
  body
}

/// Sidebar data for the site navigation.
#[must_use]
pub fn sidebar(index: &PageIndex, root: &Page, version: &str) -> Sidebar {
  let mut folders: Vec<Folder> = Vec::new();

  for (depth, page) in index.walk(root).into_iter().skip(1) {
    let title = page.title.clone();
    let url = page.permalink.clone();
    match depth {
      1 => {
        folders.push(Folder {
          title,
          url,
          folderitems: Vec::new(),
        });
      },
      2 => {
        if let Some(folder) = folders.last_mut() {
          folder.folderitems.push(FolderItem {
            title,
            url,
            subfolders: Vec::new(),
          });
        }
      },
      _ => {
        if depth > MAX_SIDEBAR_DEPTH {
          log::warn!("Sidebar depth {depth} for {}", page.permalink);
        }
        if let Some(item) = folders
          .last_mut()
          .and_then(|folder| folder.folderitems.last_mut())
        {
          item.subfolders.push(NavLink { title, url });
        }
      },
    }
  }

  Sidebar {
    entries: vec![SidebarEntry {
      title: "sidebar",
      version: version.to_string(),
      product: root.title.clone(),
      url: root.permalink.clone(),
      folders,
    }],
  }
}

/// Write the PDF include list and the sidebar data into `data_dir`.
///
/// # Errors
///
/// Returns an error if the root page cannot be found, either file already
/// exists, or writing fails.
pub fn write_navigation(
  index: &PageIndex,
  root: Option<&str>,
  data_dir: &Path,
  extension: &str,
  version: &str,
) -> Result<(), WikiscrapeError> {
  let root = root_page(index, root)?;
  log::info!("Building navigation from '{}'", root.short_name);
  fs::create_dir_all(data_dir)?;

  let pdf_file = data_dir.join(PDF_BODY_FILE);
  log::info!("Creating {}", pdf_file.display());
  write_new(&pdf_file, &pdf_main_body(index, root, extension))?;

  let sidebar_file = data_dir.join(SIDEBAR_FILE);
  log::info!("Creating {}", sidebar_file.display());
  let json = serde_json::to_string(&sidebar(index, root, version))?;
  write_new(&sidebar_file, &json)?;

  Ok(())
}

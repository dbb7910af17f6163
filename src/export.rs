//! Static-site export.
//!
//! Renders the whole catalog into a directory that can be served by any
//! static file host or opened straight from disk. Every link is relative.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # All exhibits, no search box
//! ├── sw.js                      # Service worker (root scope)
//! ├── static/
//! │   ├── style.css
//! │   ├── manifest.webmanifest
//! │   └── icon.svg
//! ├── photos/                    # Copy of photos_dir
//! │   └── ...
//! └── exhibits/
//!     ├── 1/index.html           # One card per exhibit
//!     └── 2/index.html
//! ```
//!
//! The output directory is wiped first. The workbook is read before anything
//! is deleted, so a broken workbook leaves the previous export in place.

use std::fs;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;

use crate::assets;
use crate::catalog::{self, ExhibitQuery, WorkbookSource};
use crate::config::Settings;
use crate::exhibit::Exhibit;
use crate::render::{self, Listing, Surface};
use crate::workbook::WorkbookError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk photo directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("output directory {0} contains the catalog data; refusing to delete it")]
    OverlapsData(String),
}

/// What an export wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Exhibits with a card written, in page order (duplicates included).
    pub exhibits: Vec<Exhibit>,
    /// Files copied from the photo directory.
    pub photos_copied: usize,
    /// Exhibits that ended up with a photo.
    pub with_photo: usize,
}

/// Export the catalog described by `settings` into `output_dir`.
pub fn export_site(settings: &Settings, output_dir: &Path) -> Result<ExportReport, ExportError> {
    let source = WorkbookSource::new(&settings.xlsx_path);
    let listings: Vec<Listing> = catalog::list_exhibits(&source, &ExhibitQuery::default())?
        .into_iter()
        .map(|exhibit| Listing::resolve(exhibit, &settings.photos_dir))
        .collect();

    ensure_disjoint(output_dir, settings)?;
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir.join("exhibits"))?;

    write_assets(output_dir)?;
    let photos_copied = copy_photos(&settings.photos_dir, &output_dir.join("photos"))?;

    let index = render::render_index(&listings, &ExhibitQuery::default(), &Surface::Export { depth: 0 });
    fs::write(output_dir.join("index.html"), index.into_string())?;

    let card_surface = Surface::Export { depth: 2 };
    for listing in &listings {
        let card_dir = output_dir
            .join("exhibits")
            .join(listing.exhibit.exhibit_id.to_string());
        fs::create_dir_all(&card_dir)?;
        let card = render::render_card(listing, &card_surface);
        fs::write(card_dir.join("index.html"), card.into_string())?;
    }

    let report = ExportReport {
        with_photo: listings.iter().filter(|l| l.photo.is_some()).count(),
        exhibits: listings.into_iter().map(|l| l.exhibit).collect(),
        photos_copied,
    };
    tracing::info!(
        stage = "export",
        output = %output_dir.display(),
        exhibits = report.exhibits.len(),
        photos_copied = report.photos_copied,
        "site exported"
    );
    Ok(report)
}

/// Refuse to wipe a directory that holds the workbook or the photos.
fn ensure_disjoint(output_dir: &Path, settings: &Settings) -> Result<(), ExportError> {
    let Ok(output) = output_dir.canonicalize() else {
        return Ok(());
    };
    for data in [&settings.xlsx_path, &settings.photos_dir] {
        if let Ok(data) = data.canonicalize()
            && data.starts_with(&output)
        {
            return Err(ExportError::OverlapsData(output_dir.display().to_string()));
        }
    }
    Ok(())
}

fn write_assets(output_dir: &Path) -> std::io::Result<()> {
    let static_dir = output_dir.join("static");
    fs::create_dir_all(&static_dir)?;
    for asset in assets::STATIC_ASSETS {
        fs::write(static_dir.join(asset.name), asset.body)?;
    }
    fs::write(output_dir.join(assets::SERVICE_WORKER.name), assets::SERVICE_WORKER.body)
}

/// Mirror `src` into `dst`, returning the number of files copied.
/// A missing `src` copies nothing.
fn copy_photos(src: &Path, dst: &Path) -> Result<usize, ExportError> {
    if !src.is_dir() {
        tracing::warn!(stage = "export", photos_dir = %src.display(), "photo directory not found");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

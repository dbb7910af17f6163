//! # Museum Exhibits
//!
//! A catalog of museum exhibits kept in a single Excel workbook. Curators edit
//! the spreadsheet; this crate reads it and presents the exhibits as a small
//! website, either served live or exported as static files.
//!
//! # Architecture
//!
//! ```text
//! exhibits.xlsx ─→ workbook ─→ decode ─→ Vec<Exhibit>
//!                                            │
//!                                   catalog (list / get)
//!                                            │
//!                          photos (resolve against photos_dir)
//!                                            │
//!                    ┌───────────────────────┼──────────────────┐
//!                 server                  export              output
//!              (live HTML)            (static site)        (CLI text/JSON)
//!                    └──────── render ───────┘
//! ```
//!
//! The workbook is the only source of truth. Nothing is cached: every query
//! rereads the file, so an edited spreadsheet is visible on the next request.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`exhibit`] | The `Exhibit` record |
//! | [`decode`] | Cell-level conversion: strings, identifiers, the many date encodings |
//! | [`workbook`] | Opens the `.xlsx`, locates the header row, decodes every data row |
//! | [`catalog`] | `list_exhibits` (search, museum and category filters) and `get_exhibit` |
//! | [`photos`] | Photo filename sanitizing and lookup in the photo directory |
//! | [`config`] | Layered settings: defaults, `museum.toml`, `.env`, `APP_*` variables |
//! | [`logging`] | JSON tracing to console and daily `app.<date>.log` files |
//! | [`assets`] | Stylesheet, web manifest, icon and service worker embedded at compile time |
//! | [`render`] | Maud page templates shared by the server and the export |
//! | [`server`] | Axum routes for browsing the catalog |
//! | [`export`] | Writes the whole catalog as a relative-linked static site |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Read-Through, No Cache
//!
//! Catalogs are small (hundreds of rows) and edited by hand. Rereading the
//! workbook per request keeps the server stateless and removes any question
//! of staleness.
//!
//! ## One Set of Templates, Two Surfaces
//!
//! [`render::Surface`] decides how links are written. The live server uses
//! absolute paths; the export uses paths relative to each page's depth so the
//! output works from `file://` and from any sub-path of a static host.
//!
//! ## Photo Names Are Untrusted
//!
//! The `Фото_файл` column is free text. Every value passes through
//! [`photos::sanitize_photo_name`] before it is joined onto a directory, and
//! the server only ever serves files below `photos_dir`.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod decode;
pub mod exhibit;
pub mod export;
pub mod logging;
pub mod output;
pub mod photos;
pub mod render;
pub mod server;
pub mod workbook;

//! HTML page rendering.
//!
//! Pages are built with [maud](https://maud.lambda.xyz/): templates are
//! type-checked Rust and every interpolated value is HTML-escaped.
//!
//! ## Pages
//!
//! - **Index**: exhibit tiles with photo thumbnails, plus a search box on the
//!   live server
//! - **Card**: one exhibit with its photo and every catalog field
//! - **Error**: the workbook could not be read
//! - **Not found**: no exhibit with the requested identifier
//!
//! ## Surfaces
//!
//! The same templates serve two surfaces that differ only in how links are
//! written, captured by [`Surface`]:
//!
//! | | Live server | Exported site |
//! |---|---|---|
//! | assets | `/static/style.css` | `./static/style.css`, `../../static/style.css` |
//! | cards | `/exhibits/12` | `./exhibits/12/` |
//! | photos | `/photos/12.jpg` | `../../photos/12.jpg` |
//! | search form | yes | no (nothing to answer it) |

use std::path::Path;

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::assets;
use crate::catalog::ExhibitQuery;
use crate::exhibit::Exhibit;
use crate::photos;

pub const SITE_TITLE: &str = "Музейные экспонаты";

/// Where a rendered page will be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Served by the HTTP server; absolute links.
    Live,
    /// Written to disk `depth` directories below the export root; relative links.
    Export { depth: usize },
}

impl Surface {
    fn root(&self) -> String {
        match self {
            Surface::Live => "/".to_string(),
            Surface::Export { depth: 0 } => "./".to_string(),
            Surface::Export { depth } => "../".repeat(*depth),
        }
    }

    pub fn home_href(&self) -> String {
        self.root()
    }

    pub fn asset_href(&self, name: &str) -> String {
        format!("{}static/{}", self.root(), name)
    }

    pub fn photo_href(&self, safe_name: &str) -> String {
        format!("{}photos/{}", self.root(), encode_path(safe_name))
    }

    pub fn card_href(&self, exhibit_id: i64) -> String {
        match self {
            Surface::Live => format!("/exhibits/{exhibit_id}"),
            Surface::Export { .. } => format!("{}exhibits/{exhibit_id}/", self.root()),
        }
    }

    fn service_worker_href(&self) -> String {
        format!("{}{}", self.root(), assets::SERVICE_WORKER.name)
    }

    fn has_search(&self) -> bool {
        matches!(self, Surface::Live)
    }
}

/// Percent-encode a relative path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// An exhibit paired with its resolved photo (safe name under the photo dir).
#[derive(Debug, Clone)]
pub struct Listing {
    pub exhibit: Exhibit,
    pub photo: Option<String>,
}

impl Listing {
    /// Sanitize the exhibit's photo field and look its photo up in `photos_dir`.
    pub fn resolve(exhibit: Exhibit, photos_dir: &Path) -> Self {
        let exhibit = exhibit.with_safe_photo();
        let photo = photos::resolve_photo(&exhibit, photos_dir);
        Self { exhibit, photo }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, surface: &Surface, content: Markup) -> Markup {
    let register_sw = format!(
        "if ('serviceWorker' in navigator) {{ navigator.serviceWorker.register({}); }}",
        serde_json::Value::String(surface.service_worker_href())
    );
    html! {
        (DOCTYPE)
        html lang="ru" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(surface.asset_href("style.css"));
                link rel="manifest" href=(surface.asset_href("manifest.webmanifest"));
                link rel="icon" type="image/svg+xml" href=(surface.asset_href("icon.svg"));
            }
            body {
                (content)
                script { (PreEscaped(register_sw)) }
            }
        }
    }
}

/// Renders the site header with the home link and, on the live server, search
fn site_header(surface: &Surface, query: &ExhibitQuery) -> Markup {
    html! {
        header.site-header {
            a.brand href=(surface.home_href()) { (SITE_TITLE) }
            @if surface.has_search() {
                form.search-form action="/" method="get" role="search" {
                    input type="search" name="q" value=[query.q.as_deref()]
                        placeholder="Название, музей, эпоха…" aria-label="Поиск";
                    @if let Some(museum) = query.museum.as_deref().filter(|m| !m.is_empty()) {
                        input type="hidden" name="museum" value=(museum);
                    }
                    @if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
                        input type="hidden" name="category" value=(category);
                    }
                    button type="submit" { "Найти" }
                }
            }
        }
    }
}

fn photo_or_placeholder(surface: &Surface, listing: &Listing) -> Markup {
    html! {
        @if let Some(photo) = &listing.photo {
            img src=(surface.photo_href(photo)) alt=(listing.exhibit.name) loading="lazy";
        } @else {
            div.no-photo { "Нет фото" }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the exhibit list
pub fn render_index(listings: &[Listing], query: &ExhibitQuery, surface: &Surface) -> Markup {
    let content = html! {
        (site_header(surface, query))
        main.index-page {
            @if !query.is_empty() {
                p.active-filters {
                    "Найдено: " (listings.len())
                    " · "
                    a href=(surface.home_href()) { "сбросить" }
                }
            }
            @if listings.is_empty() {
                p.empty-state { "Ничего не найдено" }
            } @else {
                div.exhibit-grid {
                    @for listing in listings {
                        a.exhibit-tile href=(surface.card_href(listing.exhibit.exhibit_id)) {
                            (photo_or_placeholder(surface, listing))
                            div.tile-body {
                                h2 { (listing.exhibit.name) }
                                span.museum { (listing.exhibit.museum) }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(SITE_TITLE, surface, content)
}

/// Renders a single exhibit card
pub fn render_card(listing: &Listing, surface: &Surface) -> Markup {
    let exhibit = &listing.exhibit;
    let received = exhibit
        .received_date
        .map(|d| d.format("%d.%m.%Y").to_string());

    let content = html! {
        (site_header(surface, &ExhibitQuery::default()))
        main.card-page {
            p { a href=(surface.home_href()) { "← Все экспонаты" } }
            article.exhibit-card {
                figure { (photo_or_placeholder(surface, listing)) }
                div.details {
                    h1 { (exhibit.name) }
                    dl {
                        dt { "Номер" } dd { (exhibit.exhibit_id) }
                        dt { "Музей" } dd { (exhibit.museum) }
                        dt { "Эпоха/период" } dd { (exhibit.period) }
                        dt { "Категория" } dd { (exhibit.category) }
                        @if let Some(received) = &received {
                            dt { "Дата поступления" } dd { (received) }
                        }
                    }
                    @if !exhibit.description.is_empty() {
                        p.description { (exhibit.description) }
                    }
                    @if !exhibit.voronezh_story.is_empty() {
                        section.story {
                            h2 { "История, связанная с Воронежем" }
                            p { (exhibit.voronezh_story) }
                        }
                    }
                }
            }
        }
    };

    base_document(&format!("{} · {}", exhibit.name, SITE_TITLE), surface, content)
}

/// Renders the page shown when the workbook cannot be read
pub fn render_error(title: &str, message: &str, xlsx_path: &str, surface: &Surface) -> Markup {
    let content = html! {
        (site_header(surface, &ExhibitQuery::default()))
        main.error-page {
            h1 { (title) }
            p { (message) }
            p { "Файл данных: " code { (xlsx_path) } }
        }
    };

    base_document(title, surface, content)
}

/// Renders the page shown for an unknown exhibit identifier
pub fn render_not_found(exhibit_id: i64, surface: &Surface) -> Markup {
    let content = html! {
        (site_header(surface, &ExhibitQuery::default()))
        main.not-found-page {
            h1 { "Экспонат не найден" }
            p { "Экспоната с номером " (exhibit_id) " нет в каталоге." }
            p { a href=(surface.home_href()) { "← Все экспонаты" } }
        }
    };

    base_document("Экспонат не найден", surface, content)
}

// ============================================================================
// Tests
// ============================================================================

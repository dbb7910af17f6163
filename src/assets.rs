//! Static assets embedded at compile time.
//!
//! The same bytes are served by the HTTP server and written by the static
//! export, so both surfaces always ship identical styling.
//!
//! ```text
//! static/style.css              → /static/style.css
//! static/manifest.webmanifest   → /static/manifest.webmanifest
//! static/icon.svg               → /static/icon.svg
//! static/sw.js                  → /sw.js   (root, so its scope covers the site)
//! ```

/// One embedded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub name: &'static str,
    pub content_type: &'static str,
    pub body: &'static str,
}

/// Assets living under `static/`.
pub const STATIC_ASSETS: &[Asset] = &[
    Asset {
        name: "style.css",
        content_type: "text/css; charset=utf-8",
        body: include_str!("../static/style.css"),
    },
    Asset {
        name: "manifest.webmanifest",
        content_type: "application/manifest+json",
        body: include_str!("../static/manifest.webmanifest"),
    },
    Asset {
        name: "icon.svg",
        content_type: "image/svg+xml",
        body: include_str!("../static/icon.svg"),
    },
];

/// Service worker, served from the site root.
pub const SERVICE_WORKER: Asset = Asset {
    name: "sw.js",
    content_type: "text/javascript; charset=utf-8",
    body: include_str!("../static/sw.js"),
};

/// Look up an asset under `static/` by file name.
pub fn find(name: &str) -> Option<&'static Asset> {
    STATIC_ASSETS.iter().find(|asset| asset.name == name)
}

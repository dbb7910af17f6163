//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every exhibit is shown by its identity first (`#id` and name) with the
//! remaining catalog fields as indented context lines, so `list` reads like
//! an inventory and `show` like a catalog card.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! #1 Икона Богоматери
//!     Художественный музей · Живопись · XVII век
//! #3 Самовар
//!     Краеведческий музей · Быт
//!
//! 2 exhibits
//! ```
//!
//! ## Show
//!
//! ```text
//! #3 Самовар
//!     Museum: Краеведческий музей
//!     Category: Быт
//!     Received: 1990-03-15
//!     Photo: 3.jpg
//!     Description: Медный самовар тульской работы
//! ```
//!
//! ## Export
//!
//! ```text
//! Home → index.html
//! #1 Икона Богоматери → exhibits/1/index.html
//! #3 Самовар → exhibits/3/index.html
//! Exported 2 exhibits (1 with photo), copied 4 photos to dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use std::path::Path;

use crate::exhibit::Exhibit;
use crate::export::ExportReport;
use crate::render::Listing;

// ============================================================================
// Shared helpers
// ============================================================================

/// `#12 Самовар`
fn exhibit_header(exhibit: &Exhibit) -> String {
    format!("#{} {}", exhibit.exhibit_id, exhibit.name)
}

/// Non-empty summary fields joined with ` · `.
fn summary_line(exhibit: &Exhibit) -> Option<String> {
    let parts: Vec<&str> = [&exhibit.museum, &exhibit.category, &exhibit.period]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" \u{b7} "))
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

// ============================================================================
// List
// ============================================================================

/// Format matching exhibits, one header line plus one summary line each.
pub fn format_exhibit_list(exhibits: &[Exhibit]) -> Vec<String> {
    let mut lines = Vec::new();
    for exhibit in exhibits {
        lines.push(exhibit_header(exhibit));
        if let Some(summary) = summary_line(exhibit) {
            lines.push(format!("    {summary}"));
        }
    }
    if !exhibits.is_empty() {
        lines.push(String::new());
    }
    lines.push(plural(exhibits.len(), "exhibit", "exhibits"));
    lines
}

pub fn print_exhibit_list(exhibits: &[Exhibit]) {
    for line in format_exhibit_list(exhibits) {
        println!("{}", line);
    }
}

// ============================================================================
// Show
// ============================================================================

/// Format one exhibit with every non-empty field.
pub fn format_exhibit_detail(listing: &Listing) -> Vec<String> {
    let exhibit = &listing.exhibit;
    let mut lines = vec![exhibit_header(exhibit)];

    let fields = [
        ("Museum", exhibit.museum.as_str()),
        ("Period", exhibit.period.as_str()),
        ("Category", exhibit.category.as_str()),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            lines.push(format!("    {label}: {value}"));
        }
    }
    if let Some(date) = exhibit.received_date {
        lines.push(format!("    Received: {}", date.format("%Y-%m-%d")));
    }
    match &listing.photo {
        Some(photo) => lines.push(format!("    Photo: {photo}")),
        None if !exhibit.photo_file.is_empty() => {
            lines.push(format!("    Photo: {} (not found)", exhibit.photo_file))
        }
        None => lines.push("    Photo: none".to_string()),
    }
    if !exhibit.description.is_empty() {
        lines.push(format!("    Description: {}", exhibit.description));
    }
    if !exhibit.voronezh_story.is_empty() {
        lines.push(format!("    Voronezh: {}", exhibit.voronezh_story));
    }
    lines
}

pub fn print_exhibit_detail(listing: &Listing) {
    for line in format_exhibit_detail(listing) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format export results: every page written, then a totals line.
pub fn format_export_output(report: &ExportReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];
    for exhibit in &report.exhibits {
        lines.push(format!(
            "{} \u{2192} exhibits/{}/index.html",
            exhibit_header(exhibit),
            exhibit.exhibit_id
        ));
    }
    lines.push(format!(
        "Exported {} ({} with photo), copied {} to {}",
        plural(report.exhibits.len(), "exhibit", "exhibits"),
        report.with_photo,
        plural(report.photos_copied, "photo", "photos"),
        output_dir.display()
    ));
    lines
}

pub fn print_export_output(report: &ExportReport, output_dir: &Path) {
    for line in format_export_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(xlsx_path: &Path, count: usize) -> Vec<String> {
    vec![format!(
        "{}: {}",
        xlsx_path.display(),
        plural(count, "exhibit", "exhibits")
    )]
}

pub fn print_check_output(xlsx_path: &Path, count: usize) {
    for line in format_check_output(xlsx_path, count) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Photo lookup for exhibits.
//!
//! Photos live in a single configured directory. An exhibit's photo is found
//! by trying candidate filenames in a fixed order; the first one that exists
//! wins:
//!
//! ```text
//! {id}.png → {id}.jpg → {id}.jpeg → {id}.webp → photo_file from the workbook
//! ```
//!
//! Every candidate is sanitized before it touches the filesystem, so a
//! workbook value like `../../etc/passwd` can never resolve outside the
//! photo directory.

use std::path::Path;

use crate::exhibit::Exhibit;

/// Extensions probed for `{exhibit_id}.{ext}`, in priority order.
pub const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Make a photo filename safe to join onto the photo directory.
///
/// - Removes every `..` sequence
/// - Converts backslashes to forward slashes
/// - Drops empty and `.` segments, so the result is never absolute
///
/// `"../../etc/passwd"` → `"etc/passwd"`, `"sub\\a.jpg"` → `"sub/a.jpg"`.
pub fn sanitize_photo_name(name: &str) -> String {
    name.replace("..", "")
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Candidate filenames for an exhibit's photo, in lookup order, unsanitized.
pub fn photo_candidates(exhibit: &Exhibit) -> Vec<String> {
    let mut candidates: Vec<String> = PHOTO_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{}", exhibit.exhibit_id, ext))
        .collect();
    if !exhibit.photo_file.is_empty() {
        candidates.push(exhibit.photo_file.clone());
    }
    candidates
}

/// Find the exhibit's photo under `photos_dir`.
///
/// Returns the sanitized name relative to `photos_dir` (forward slashes),
/// or `None` when no candidate exists.
pub fn resolve_photo(exhibit: &Exhibit, photos_dir: &Path) -> Option<String> {
    photo_candidates(exhibit)
        .iter()
        .map(|candidate| sanitize_photo_name(candidate))
        .filter(|safe| !safe.is_empty())
        .find(|safe| photos_dir.join(safe).is_file())
}

/// Copy of the exhibit with a sanitized `photo_file`, for exposing the stored
/// name without any lookup.
pub fn sanitize_photo_field(exhibit: &Exhibit) -> Exhibit {
    exhibit.with_safe_photo()
}

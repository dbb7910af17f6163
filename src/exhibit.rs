//! The exhibit record.
//!
//! An [`Exhibit`] is built fresh from the workbook on every read and never
//! mutated afterwards. Deriving a variant (see [`Exhibit::with_safe_photo`])
//! produces a new value.

use chrono::NaiveDate;
use serde::Serialize;

use crate::photos;

/// One catalog record describing a physical museum item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exhibit {
    /// Identifier from the `ID_Экспоната` column. Not guaranteed unique:
    /// duplicate rows in the workbook are all kept.
    pub exhibit_id: i64,
    pub name: String,
    pub museum: String,
    pub description: String,
    pub period: String,
    pub category: String,
    /// Date the item entered the collection, when the cell could be understood.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    /// Raw photo filename as typed into the workbook. May be empty and may
    /// contain anything, including traversal sequences.
    pub photo_file: String,
    /// Local-history note linking the item to Voronezh.
    pub voronezh_story: String,
}

impl Exhibit {
    /// Copy of this exhibit with `photo_file` passed through
    /// [`photos::sanitize_photo_name`]. No filesystem access.
    pub fn with_safe_photo(&self) -> Exhibit {
        Exhibit {
            photo_file: photos::sanitize_photo_name(&self.photo_file),
            ..self.clone()
        }
    }
}

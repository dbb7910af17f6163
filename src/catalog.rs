//! Exhibit queries: list with search and filters, lookup by identifier.
//!
//! Both queries reload the full data source on every call. Filtering is a
//! pure function over the loaded records ([`filter_exhibits`]) so it can be
//! exercised without a workbook.
//!
//! ## Filter semantics
//!
//! Filters compose with AND, applied in this order:
//!
//! 1. `q`: case-insensitive substring of name, description, museum,
//!    category or period (any of them)
//! 2. `museum`: case-insensitive equality with the museum name
//! 3. `category`: case-insensitive equality with the category
//!
//! All comparisons trim surrounding whitespace. Absent or empty filters are
//! ignored. The result is sorted by `exhibit_id`, ties keeping sheet order.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::exhibit::Exhibit;
use crate::workbook::{self, WorkbookError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error("exhibit not found")]
    NotFound(i64),
}

/// Where exhibits come from.
pub trait ExhibitSource {
    /// Load every exhibit, in source order.
    fn load(&self) -> Result<Vec<Exhibit>, WorkbookError>;
}

/// The production source: a workbook file read fresh on each load.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExhibitSource for WorkbookSource {
    fn load(&self) -> Result<Vec<Exhibit>, WorkbookError> {
        workbook::read_exhibits(&self.path)
    }
}

/// Search and filter parameters for [`list_exhibits`].
///
/// Deserializes straight from the index page query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExhibitQuery {
    pub q: Option<String>,
    pub museum: Option<String>,
    pub category: Option<String>,
}

impl ExhibitQuery {
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Filters that will actually be applied (non-empty ones).
    fn active(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        Self::active(&self.q).is_none()
            && Self::active(&self.museum).is_none()
            && Self::active(&self.category).is_none()
    }
}

/// All exhibits matching `query`, sorted by identifier.
pub fn list_exhibits<S>(source: &S, query: &ExhibitQuery) -> Result<Vec<Exhibit>, WorkbookError>
where
    S: ExhibitSource + ?Sized,
{
    let exhibits = source.load()?;
    Ok(filter_exhibits(exhibits, query))
}

/// The first exhibit with `exhibit_id`, in source order.
pub fn get_exhibit<S>(source: &S, exhibit_id: i64) -> Result<Exhibit, CatalogError>
where
    S: ExhibitSource + ?Sized,
{
    source
        .load()?
        .into_iter()
        .find(|e| e.exhibit_id == exhibit_id)
        .ok_or(CatalogError::NotFound(exhibit_id))
}

/// Apply `query` to already loaded exhibits and sort the survivors.
pub fn filter_exhibits(mut exhibits: Vec<Exhibit>, query: &ExhibitQuery) -> Vec<Exhibit> {
    if let Some(q) = ExhibitQuery::active(&query.q) {
        let needle = normalize(q);
        exhibits.retain(|e| {
            [&e.name, &e.description, &e.museum, &e.category, &e.period]
                .iter()
                .any(|field| normalize(field).contains(&needle))
        });
    }
    if let Some(museum) = ExhibitQuery::active(&query.museum) {
        let wanted = normalize(museum);
        exhibits.retain(|e| normalize(&e.museum) == wanted);
    }
    if let Some(category) = ExhibitQuery::active(&query.category) {
        let wanted = normalize(category);
        exhibits.retain(|e| normalize(&e.category) == wanted);
    }
    exhibits.sort_by_key(|e| e.exhibit_id);
    exhibits
}

/// Case-folded, trimmed form used for every comparison.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
